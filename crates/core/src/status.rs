//! Status enums mapping to SMALLINT columns.
//!
//! Each variant's discriminant matches the value stored in the corresponding
//! `status_id` column; the string form is what the API exposes.

use serde::{Deserialize, Serialize};

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
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID, `None` for unknown values.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Aggregate task lifecycle status.
    ///
    /// Moves forward only: `Published -> Claimed -> Submitted -> Completed`,
    /// with `Cancelled` reachable from any non-terminal state.
    TaskStatus {
        Published = 1 => "published",
        Claimed = 2 => "claimed",
        Submitted = 3 => "submitted",
        Completed = 4 => "completed",
        Cancelled = 5 => "cancelled",
    }
}

define_status_enum! {
    /// Review status of one engineer's submission.
    SubmissionStatus {
        /// Claimed, nothing submitted yet.
        Draft = 1 => "draft",
        Pending = 2 => "pending",
        Approved = 3 => "approved",
        Rejected = 4 => "rejected",
    }
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Position on the forward path; `Cancelled` is off-path.
    fn rank(self) -> Option<u8> {
        match self {
            TaskStatus::Published => Some(0),
            TaskStatus::Claimed => Some(1),
            TaskStatus::Submitted => Some(2),
            TaskStatus::Completed => Some(3),
            TaskStatus::Cancelled => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    ///
    /// Skipping intermediate states is allowed (a submit without a prior
    /// claim moves `Published -> Submitted`); staying put or moving back is not.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    /// Whether a task in this status is at or beyond `other` on the forward path.
    pub fn has_reached(self, other: TaskStatus) -> bool {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => a >= b,
            _ => self == other,
        }
    }
}
