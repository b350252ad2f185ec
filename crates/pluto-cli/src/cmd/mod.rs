pub mod add;
pub mod fetch;
pub mod inspect;
pub mod install;
pub mod list;
pub mod lock;
pub mod remove;
pub mod update;

use pluto_schema::VersionSpec;

use crate::PinArgs;

/// The pin selected by `--tag` / `--commit`, if any.
pub(crate) fn pin_from_args(pin: &PinArgs) -> Option<VersionSpec> {
    match (&pin.tag, &pin.commit) {
        (Some(tag), _) => Some(VersionSpec::Tag(tag.clone())),
        (None, Some(commit)) => Some(VersionSpec::Commit(commit.clone())),
        (None, None) => None,
    }
}
