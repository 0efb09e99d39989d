use std::fs::File;
use std::io::Write;

use shadow_rs::SdResult;
use shadow_rs::ShadowBuilder;

// git metadata is only present when building from a checkout
const CHECKOUT_VERSION: &str = r##"pub const LONG_VERSION: &str = shadow_rs::formatcp!(r#"{}
branch:{}
commit_hash:{}
build_time:{}
build_env:{},{}"#, PKG_VERSION, BRANCH, COMMIT_HASH, BUILD_TIME, RUST_VERSION, RUST_CHANNEL
);"##;

const PACKAGED_VERSION: &str = r##"pub const LONG_VERSION: &str = shadow_rs::formatcp!(r#"{}
build_time:{}
build_env:{},{}"#, PKG_VERSION, BUILD_TIME, RUST_VERSION, RUST_CHANNEL
);"##;

fn checkout_hook(mut file: &File) -> SdResult<()> {
    writeln!(file, "{CHECKOUT_VERSION}")?;
    Ok(())
}

fn packaged_hook(mut file: &File) -> SdResult<()> {
    writeln!(file, "{PACKAGED_VERSION}")?;
    Ok(())
}

fn main() -> SdResult<()> {
    let shadow = ShadowBuilder::builder().hook(checkout_hook).build()?;

    let from_checkout = shadow
        .map
        .get("BRANCH")
        .is_some_and(|entry| !entry.v.is_empty());

    if !from_checkout {
        ShadowBuilder::builder().hook(packaged_hook).build()?;
    }

    Ok(())
}
