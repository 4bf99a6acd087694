use zk_mixer::errors::ZkMixerError;

/// Integration-side twin of the crate's `assert_error`
pub fn assert_code(err: anchor_lang::error::Error, expected: ZkMixerError) {
    match err {
        anchor_lang::error::Error::AnchorError(e) => assert_eq!(
            e.error_code_number,
            u32::from(expected),
            "{}",
            e.error_msg
        ),
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}
