// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use view_synthesis::constants::{config_keys, defaults, file_filters, renderer_flags};

#[test]
fn test_injected_keys_in_write_order() {
    assert_eq!(
        config_keys::INJECTED,
        [
            "VideoInputFile_0",
            "DepthInputFile_0",
            "VideoInputFile_1",
            "DepthInputFile_1",
            "SynthViewCameraNumbers",
            "SynthOutputFileBaseName",
        ]
    );
}

#[test]
fn test_renderer_flags() {
    let flags = [
        renderer_flags::CONFIG,
        renderer_flags::CAMERA_PARAMETERS,
        renderer_flags::WIDTH,
        renderer_flags::HEIGHT,
        renderer_flags::FRAMES,
        renderer_flags::SKIPS,
    ];
    assert_eq!(flags, ["-c", "-cpf", "-wdt", "-hgt", "-f", "-fs"]);
}

#[test]
fn test_default_views_add_up() {
    assert_eq!(
        defaults::LEFT_VIEWS + defaults::RIGHT_VIEWS,
        defaults::TOTAL_VIEWS,
        "Default left and right views should cover the total"
    );
}

#[test]
fn test_file_filters() {
    assert_eq!(file_filters::YUV.1, &["yuv"]);
    assert_eq!(file_filters::CFG.1, &["cfg"]);
}
