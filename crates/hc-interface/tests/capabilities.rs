//! Interface query and cast behavior of registered cores

use std::path::Path;
use std::sync::{Arc, Mutex};

use hc_abi::CoreInfo;
use hc_interface::*;

/// Records every call made through its interfaces
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    sample_rate: u32,
    rewind_frames: u32,
    audio_callback: Option<AudioCallback>,
}

impl IBase for Recorder {
    fn load_file(&mut self, content_type: &str, path: &Path) -> bool {
        self.calls.push(format!("load {} {}", content_type, path.display()));
        content_type == "rom"
    }

    fn reset(&mut self) {
        self.calls.push("reset".into());
    }

    fn native_size(&self) -> Size {
        Size::new(256, 224)
    }

    fn set_output_size(&mut self, size: Size) {
        self.calls.push(format!("output {}x{}", size.width, size.height));
    }
}

impl IAudio for Recorder {
    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    fn set_audio_callback(&mut self, callback: AudioCallback) {
        self.audio_callback = Some(callback);
    }
}

impl IRewind for Recorder {
    fn rewind_frame(&mut self) {
        self.calls.push("rewind".into());
    }

    fn rewind_frame_count(&self) -> u32 {
        self.rewind_frames
    }

    fn set_rewind_frame_count(&mut self, count: u32) -> bool {
        if count > 600 {
            return false;
        }
        self.rewind_frames = count;
        true
    }
}

impl Recorder {
    fn emit_audio(&mut self, samples: &[u8]) {
        if let Some(callback) = self.audio_callback.as_mut() {
            callback(samples);
        }
    }
}

hydra_class!(Recorder: IAudio, IRewind);

#[test]
fn test_query_matches_registration() {
    let core = Recorder::default();
    for kind in InterfaceType::ALL {
        let expected = matches!(
            kind,
            InterfaceType::IBase | InterfaceType::IAudio | InterfaceType::IRewind
        );
        assert_eq!(core.has_interface(kind), expected, "{}", kind.name());
    }
    assert_eq!(
        core.interfaces(),
        InterfaceSet::BASE | InterfaceSet::AUDIO | InterfaceSet::REWIND
    );
}

#[test]
fn test_casts_reach_the_instance() {
    let mut core = Recorder::default();

    let audio = core.as_audio().expect("registered");
    assert_eq!(audio.sample_type(), SampleType::Int16);
    assert_eq!(audio.channel_type(), ChannelType::Stereo);
    audio.set_sample_rate(44100);
    assert_eq!(core.sample_rate, 44100);

    let rewind = core.as_rewind().expect("registered");
    assert!(rewind.set_rewind_frame_count(120));
    assert!(!rewind.set_rewind_frame_count(10_000));
    rewind.rewind_frame();
    assert_eq!(core.rewind_frames, 120);
    assert_eq!(core.calls, vec!["rewind"]);
}

#[test]
fn test_absent_interfaces_are_none() {
    let mut core = Recorder::default();
    assert!(core.as_frontend_driven().is_none());
    assert!(core.as_self_driven().is_none());
    assert!(core.as_software_rendered().is_none());
    assert!(core.as_opengl_rendered().is_none());
    assert!(core.as_input().is_none());
    assert!(core.as_save_state().is_none());
    assert!(core.as_multiplayer().is_none());
    assert!(core.as_log().is_none());
    assert!(core.as_readable_memory().is_none());
    assert!(core.as_cheat().is_none());
}

#[test]
fn test_handle_forwards() {
    let mut handle = CoreHandle::new(Recorder::default());
    assert!(handle.has_interface(InterfaceType::IAudio));
    assert!(!handle.has_interface(InterfaceType::ICheat));
    assert!(handle.load_file("rom", Path::new("game.bin")));
    assert!(!handle.load_file("bios", Path::new("bios.bin")));
    let size = handle.native_size();
    handle.set_output_size(size);

    let base = handle.as_base().expect("always registered");
    base.reset();
    assert!(handle.as_cheat().is_none());
    handle.as_rewind().expect("registered").rewind_frame();
}

#[test]
fn test_callback_through_cast() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    let mut core = Recorder::default();
    core.as_audio()
        .expect("registered")
        .set_audio_callback(Box::new(move |data: &[u8]| sink.lock().unwrap().extend_from_slice(data)));
    core.emit_audio(&[1, 2, 3, 4]);
    assert_eq!(*received.lock().unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_factory() {
    let info = CoreInfo {
        core_name: "Recorder".into(),
        license: "MIT".into(),
        ..Default::default()
    };
    let factory = CoreFactory::new(info, || CoreHandle::new(Recorder::default()));
    assert_eq!(factory.get_info(InfoType::CoreName).as_deref(), Some("Recorder"));
    assert_eq!(factory.get_info(InfoType::Website), None);

    let core = factory.create_emulator();
    assert!(core.has_interface(InterfaceType::IRewind));
    factory.destroy_emulator(core);
}
