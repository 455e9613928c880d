//! Remote-control button notifications pushed by the head.

pub const NOTIFICATION_LEN: usize = 20;

const fn button_payload(state: u8, check: u8) -> [u8; NOTIFICATION_LEN] {
    let mut payload = [0xFF; NOTIFICATION_LEN];
    payload[0] = 0xFE;
    payload[1] = 0x01;
    payload[2] = 0x08;
    payload[3] = state;
    payload[4] = check;
    payload
}

pub const TOP_BUTTON: [u8; NOTIFICATION_LEN] = button_payload(0x01, 0x08);
pub const BOTTOM_BUTTON: [u8; NOTIFICATION_LEN] = button_payload(0x00, 0x07);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEvent {
    Top,
    Bottom,
}

impl ButtonEvent {
    /// Matches a notification value against the known button payloads.
    ///
    /// Anything else the head sends on the notification characteristic is
    /// ignored.
    pub fn from_notification(value: &[u8]) -> Option<Self> {
        if value == TOP_BUTTON {
            Some(Self::Top)
        } else if value == BOTTOM_BUTTON {
            Some(Self::Bottom)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_payloads() {
        let top = [
            0xFE, 0x01, 0x08, 0x01, 0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        ];
        assert_eq!(ButtonEvent::from_notification(&top), Some(ButtonEvent::Top));
        assert_eq!(
            ButtonEvent::from_notification(&BOTTOM_BUTTON),
            Some(ButtonEvent::Bottom)
        );
    }

    #[test]
    fn ignores_anything_else() {
        assert_eq!(ButtonEvent::from_notification(&TOP_BUTTON[..19]), None);
        let mut noisy = BOTTOM_BUTTON;
        noisy[19] = 0x00;
        assert_eq!(ButtonEvent::from_notification(&noisy), None);
        assert_eq!(ButtonEvent::from_notification(&[]), None);
    }
}
