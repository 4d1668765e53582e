//! Marker names
//!
//! A marker is a named reference image whose appearance on screen signals
//! a specific game-UI state. The names double as keys into the matcher's
//! template set; the loose `*.png` assets in the image directory carry the
//! same names.

/// Main menu is on screen.
pub const MENU: &str = "menu";
/// The quest tile supplied by the operator.
pub const QUEST: &str = "quest";
/// AP recovery dialog is showing.
pub const AP_REGEN: &str = "ap_regen";
/// Confirmation button in the AP recovery dialog.
pub const DECIDE: &str = "decide";
/// Support selection screen (its refresh button).
pub const REFRESH_FRIENDS: &str = "refresh_friends";
/// Confirmation button of the refresh dialog.
pub const YES: &str = "yes";
/// Quest start button on the party screen.
pub const START_QUEST: &str = "start_quest";
/// Attack button; the universal "ready for input" signal in battle.
pub const ATTACK: &str = "attack";
/// Bond result screen, meaning the battle is over.
pub const BOND: &str = "bond";
/// Bond level-up variant of the result screen.
pub const BOND_UP: &str = "bond_up";
/// Proceed button on the reward summary.
pub const NEXT_STEP: &str = "next_step";
/// First-clear bonus overlay.
pub const PLEASE_TAP: &str = "please_tap";
/// Decline button of the friend request dialog.
pub const NOT_APPLY: &str = "not_apply";
/// Skill target chooser is showing.
pub const CHOOSE_OBJECT: &str = "choose_object";
/// Order Change chooser is showing.
pub const CHANGE_DISABLED: &str = "change_disabled";
/// Order Change confirm button.
pub const CHANGE: &str = "change";

/// Indicator image name for a stage, e.g. `2_3` for stage 2 of 3.
pub fn stage_indicator(stage: u8, stage_count: u8) -> String {
    format!("{stage}_{stage_count}")
}

/// Template name for the `index`-th acceptable support servant.
pub fn friend_slot(index: usize) -> String {
    format!("friend_{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_formatting() {
        assert_eq!(stage_indicator(2, 3), "2_3");
        assert_eq!(friend_slot(0), "friend_0");
    }
}
