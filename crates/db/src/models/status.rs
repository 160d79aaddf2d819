//! Status enums stored as constrained `TEXT` columns.
//!
//! Each variant maps to exactly one lowercase literal, which is also the
//! value accepted by the column's `CHECK` constraint and the JSON
//! representation sent to clients.

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::Postgres;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// The database and wire literal for this status.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse a stored literal; `None` for unknown values.
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<Postgres>>::decode(value)?;
                $name::parse(raw).ok_or_else(|| {
                    format!("unknown {} value '{raw}'", stringify!($name)).into()
                })
            }
        }

        impl sqlx::Encode<'_, Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

define_status_enum! {
    /// Training run lifecycle. Advances created -> processing -> completed|failed.
    TrainingStatus {
        Created = "created",
        Processing = "processing",
        Completed = "completed",
        Failed = "failed",
    }
}

define_status_enum! {
    /// Detection run lifecycle. Advances created -> processing -> completed|failed.
    DetectionStatus {
        Created = "created",
        Processing = "processing",
        Completed = "completed",
        Failed = "failed",
    }
}

define_status_enum! {
    /// Model lifecycle, driven by its trainings.
    ModelStatus {
        Created = "created",
        Training = "training",
        Trained = "trained",
        Failed = "failed",
    }
}

define_status_enum! {
    /// Queue state of a job row.
    JobStatus {
        Queued = "queued",
        Running = "running",
        Completed = "completed",
        Failed = "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_round_trip() {
        for status in [
            TrainingStatus::Created,
            TrainingStatus::Processing,
            TrainingStatus::Completed,
            TrainingStatus::Failed,
        ] {
            assert_eq!(TrainingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ModelStatus::parse("bogus"), None);
    }

    #[test]
    fn serde_uses_lowercase_literals() {
        let json = serde_json::to_value(JobStatus::Queued).unwrap();
        assert_eq!(json, "queued");
        let parsed: DetectionStatus = serde_json::from_value("processing".into()).unwrap();
        assert_eq!(parsed, DetectionStatus::Processing);
    }
}
