// tests/camera_detect.rs

mod common;
use crate::common::init_tracing;

use eclipse_sequencer::config::DeviceSection;
use eclipse_sequencer::device::gphoto::format_shutter;
use eclipse_sequencer::device::{parse_auto_detect, select_camera, DetectedCamera, GphotoCamera};
use eclipse_sequencer::errors::DeviceError;

const AUTO_DETECT: &str = "\
Model                          Port
----------------------------------------------------------
Canon EOS 5D Mark III          usb:001,004
Canon EOS R5                   usb:001,007
Nikon DSC D850                 usb:002,003
";

fn detected() -> Vec<DetectedCamera> {
    parse_auto_detect(AUTO_DETECT)
}

#[test]
fn auto_detect_table_is_parsed() {
    let cameras = detected();
    assert_eq!(cameras.len(), 3);
    assert_eq!(
        cameras[0],
        DetectedCamera {
            model: "Canon EOS 5D Mark III".to_string(),
            port: "usb:001,004".to_string(),
        }
    );
    assert_eq!(cameras[2].port, "usb:002,003");
}

#[test]
fn auto_detect_without_cameras_is_empty() {
    let text = "Model                          Port\n----------------------\n";
    assert!(parse_auto_detect(text).is_empty());
}

#[test]
fn no_filter_selects_first_camera() {
    let camera = select_camera(&detected(), None, None).unwrap();
    assert_eq!(camera.model, "Canon EOS 5D Mark III");

    match select_camera(&[], None, None) {
        Err(DeviceError::InitFailed(msg)) => assert!(msg.contains("no cameras")),
        other => panic!("expected InitFailed, got {other:?}"),
    }
}

#[test]
fn model_substring_and_port_narrow_the_choice() {
    let camera = select_camera(&detected(), Some("Nikon"), None).unwrap();
    assert_eq!(camera.port, "usb:002,003");

    let camera = select_camera(&detected(), Some("Canon"), Some("usb:001,007")).unwrap();
    assert_eq!(camera.model, "Canon EOS R5");
}

#[test]
fn ambiguous_or_unmatched_selection_fails() {
    match select_camera(&detected(), Some("Canon"), None) {
        Err(DeviceError::InitFailed(msg)) => assert!(msg.contains("not specific enough")),
        other => panic!("expected InitFailed, got {other:?}"),
    }

    match select_camera(&detected(), Some("Sony"), None) {
        Err(DeviceError::InitFailed(msg)) => assert!(msg.contains("no connected cameras match")),
        other => panic!("expected InitFailed, got {other:?}"),
    }
}

#[test]
fn shutter_speeds_are_rendered_as_fractions() {
    assert_eq!(format_shutter(1.0 / 250.0), "1/250");
    assert_eq!(format_shutter(0.5), "1/2");
    assert_eq!(format_shutter(2.0), "2");
}

#[tokio::test]
async fn missing_camera_program_is_an_init_failure() {
    init_tracing();
    let settings = DeviceSection {
        program: "eclipse-sequencer-no-such-gphoto2".to_string(),
        ..DeviceSection::default()
    };

    match GphotoCamera::connect(&settings).await {
        Err(DeviceError::InitFailed(msg)) => {
            assert!(msg.contains("eclipse-sequencer-no-such-gphoto2"))
        }
        other => panic!("expected InitFailed, got {other:?}"),
    }
}
