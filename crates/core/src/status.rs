//! Closed status enums mapping to SMALLINT columns.
//!
//! Every enum variant's discriminant matches the value stored in the
//! corresponding `*_id` database column, and every variant carries a stable
//! wire label used in API payloads and query parameters. Representing these
//! as closed variants (not free-text strings) keeps status handling
//! exhaustively matchable.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant from its database ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Stable wire label (used in API payloads and query params).
            pub fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            /// Look up a variant from its wire label.
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $( $label => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Artifact content kind. Drives TTL and daily posting caps.
    ArtifactKind {
        /// Short-lived chat bubble pinned to a location.
        Chat = 1 => "chat",
        /// Bulletin-board post. Longest-lived kind.
        BoardPost = 2 => "board_post",
        /// Announcement (event callout, venue notice).
        Announce = 3 => "announce",
    }
}

define_status_enum! {
    /// Artifact moderation lifecycle.
    ///
    /// `Removed` and `Expired` are terminal; the expiry sweep only ever moves
    /// non-terminal artifacts to `Expired`.
    ModerationStatus {
        Clean = 1 => "clean",
        Flagged = 2 => "flagged",
        ShadowThrottled = 3 => "shadow_throttled",
        Removed = 4 => "removed",
        Expired = 5 => "expired",
    }
}

define_status_enum! {
    /// Why a shadow throttle was applied.
    ThrottleReason {
        Spam = 1 => "spam",
        FlaggedContent = 2 => "flagged_content",
        GeoSpoof = 3 => "geo_spoof",
        RapidPosting = 4 => "rapid_posting",
        Manual = 5 => "manual",
    }
}

impl ModerationStatus {
    /// Terminal statuses never transition further.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Removed | Self::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for kind in [ArtifactKind::Chat, ArtifactKind::BoardPost, ArtifactKind::Announce] {
            assert_eq!(ArtifactKind::from_id(kind.id()), Some(kind));
        }
        for status in [
            ModerationStatus::Clean,
            ModerationStatus::Flagged,
            ModerationStatus::ShadowThrottled,
            ModerationStatus::Removed,
            ModerationStatus::Expired,
        ] {
            assert_eq!(ModerationStatus::from_id(status.id()), Some(status));
        }
    }

    #[test]
    fn labels_round_trip() {
        assert_eq!(ArtifactKind::from_label("board_post"), Some(ArtifactKind::BoardPost));
        assert_eq!(ThrottleReason::from_label("geo_spoof"), Some(ThrottleReason::GeoSpoof));
        assert_eq!(ModerationStatus::Clean.label(), "clean");
    }

    #[test]
    fn unknown_ids_and_labels_are_rejected() {
        assert_eq!(ArtifactKind::from_id(99), None);
        assert_eq!(ModerationStatus::from_label("banned"), None);
        assert_eq!(ThrottleReason::from_id(0), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(ModerationStatus::Removed.is_terminal());
        assert!(ModerationStatus::Expired.is_terminal());
        assert!(!ModerationStatus::Clean.is_terminal());
        assert!(!ModerationStatus::Flagged.is_terminal());
        assert!(!ModerationStatus::ShadowThrottled.is_terminal());
    }
}
