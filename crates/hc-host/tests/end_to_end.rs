//! Drive the test pattern core through its C exports in-process

use std::sync::Mutex;

use hc_abi::loader::load_host_functions;
use hc_abi::raw::HcCallbacks;
use hc_abi::*;
use hc_core::{Config, HydraError};
use hc_demo_core::button_input_type;
use hc_host::*;
use hc_interface::ButtonType;

/// The host context and the core slot are process-wide
static SERIAL: Mutex<()> = Mutex::new(());

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn exports() -> CoreExports {
    CoreExports {
        get_core_info: hc_demo_core::hcGetCoreInfo,
        create: hc_demo_core::hcCreate,
        destroy: hc_demo_core::hcDestroy,
        reset: hc_demo_core::hcReset,
        set_run_state: hc_demo_core::hcSetRunState,
        load_content: hc_demo_core::hcLoadContent,
        get_error: hc_demo_core::hcGetError,
        internal_load_functions: hc_demo_core::hcInternalLoadFunctions,
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.audio.buffer_samples = 4096;
    config
}

#[test]
fn test_frontend_driven_lifecycle() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    init_logging();

    let library = CoreLibrary::from_exports(exports()).unwrap();
    let info = library.core_info();
    assert_eq!(info.core_name, "Test Pattern");
    assert_eq!(info.loadable_content.len(), 1);
    assert_eq!(info.icon.as_ref().map(|i| (i.width, i.height)), Some((2, 2)));

    let mut runner = CoreRunner::new(library, &config()).unwrap();
    let environment = *runner.environment();
    assert_eq!(environment.drive_mode, DriveMode::FrontendDriven);
    assert_eq!(environment.video.map(|v| (v.width, v.height)), Some((160, 120)));
    assert_eq!(runner.frame_interval().map(|d| d.as_micros()), Some(16666));

    // One instance at a time
    let second = CoreLibrary::from_exports(exports()).unwrap();
    assert!(matches!(
        CoreRunner::new(second, &config()),
        Err(HydraError::TooManyInstances { limit: 1 })
    ));

    // Nothing runs before the core is started
    assert!(!runner.run_frame().unwrap());

    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("seed.pat");
    std::fs::write(&seed, [0u8]).unwrap();
    runner.load_content(&seed).unwrap();
    assert!(matches!(
        runner.load_content(&dir.path().join("seed.rom")),
        Err(HydraError::BadContent(_))
    ));

    runner.start().unwrap();
    assert_eq!(runner.run_state(), RunState::Running);
    assert_eq!(runner.run_frames(3, false).unwrap(), 3);
    assert_eq!(runner.frames_received(), 3);
    assert_eq!(runner.drain_audio().len(), 3 * 800 * 4);

    // Holding A inverts the pattern; the fourth frame is shifted by 3
    runner
        .set_input(0, button_input_type(ButtonType::A), 1)
        .unwrap();
    assert!(runner.run_frame().unwrap());
    let frame = runner.latest_frame().unwrap();
    assert_eq!((frame.width, frame.height), (160, 120));
    assert_eq!(frame.format, PixelFormat::Rgba32);
    assert_eq!(frame.pixel(0, 0), Some(&[252u8, 252, 252, 255][..]));

    // Undrained audio stops at the queue capacity
    runner.drain_audio();
    assert_eq!(runner.run_frames(6, false).unwrap(), 6);
    assert_eq!(runner.drain_audio().len(), 5 * 800 * 4);

    runner.pause().unwrap();
    assert!(!runner.run_frame().unwrap());

    // The core rejects going back to Null and explains why
    let err = runner.library().set_run_state(RunState::Null).unwrap_err();
    match err {
        HydraError::Core(message) => assert!(message.contains("to Null"), "{}", message),
        other => panic!("unexpected {other:?}"),
    }

    runner.reset(ResetType::Soft).unwrap();
    runner.quit().unwrap();
    assert_eq!(runner.run_state(), RunState::Null);
    assert!(!runner.library().is_created());
    drop(runner);
    assert!(!host_context().is_active());
}

#[test]
fn test_host_functions_reject_bad_requests() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    init_logging();

    let host = load_host_functions(Some(resolve_host_symbol)).unwrap();
    assert!(!host_context().is_active());

    let pixels = [0u8; 16];
    let image = ImageData::packed(&pixels, 2, 2, PixelFormat::Rgba32);
    assert!(matches!(
        host.push_video_frame(&image),
        Err(HydraError::NotSoftwareRendered)
    ));

    let info = AudioInfo {
        format: AudioFormat::S16Pcm,
        channels: AudioChannels::Stereo,
        sample_rate: 48000,
    };
    let samples = [0u8; 8];
    let audio = AudioData {
        data: &samples,
        sample_count: 2,
        want: info,
        have: info,
    };
    assert!(matches!(
        host.push_samples(&audio),
        Err(HydraError::BadAudioDataHave(_))
    ));

    let request = InputRequest {
        port: 99,
        input_type: button_input_type(ButtonType::A),
    };
    assert!(matches!(
        host.get_inputs_sync(&[request]),
        Err(HydraError::BadInputRequest(_))
    ));

    let environment = EnvironmentInfo {
        drive_mode: DriveMode::FrontendDriven,
        video: None,
        audio: None,
    };
    assert!(matches!(
        host.reconfigure_environment(&environment),
        Err(HydraError::BadEnvironmentInfo(_))
    ));
    assert!(matches!(
        host.gl_make_current(),
        Err(HydraError::NotOpenGlRendered)
    ));
    assert!(host.gl_get_proc_address(c"glClear").is_null());
    assert!(matches!(
        host.set_callbacks(&HcCallbacks::default()),
        Err(HydraError::NotAllCallbacksSet)
    ));
}
