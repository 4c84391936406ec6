//! Well-known timestamp struct.
//!
//! Timestamps are opaque: their fields are private, so the merger copies them
//! by round-tripping through [`Timestamp::to_binary`] rather than field by
//! field.

use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{FieldDescriptor, IntKind, StructType, StructValue, Type, UintKind, Value};
use crate::{MorphError, MorphResult};

/// Name of the struct type backing [`Timestamp`].
pub(crate) const TIMESTAMP_TYPE_NAME: &str = "Timestamp";

/// Identity of the timestamp table. Derived tables are identified by their
/// own type path, so no user struct can claim it.
pub(crate) const TIMESTAMP_IDENTITY: &str = "std::time::SystemTime";

const BINARY_LEN: usize = 12;

/// Seconds and nanoseconds relative to the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// Build a timestamp; `nanos` carries into `secs` when it exceeds one
    /// second.
    #[must_use]
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Self {
            secs: secs + (nanos / 1_000_000_000) as i64,
            nanos: nanos % 1_000_000_000,
        }
    }

    /// Seconds since the epoch.
    #[must_use]
    pub const fn secs(self) -> i64 {
        self.secs
    }

    /// Sub-second nanoseconds.
    #[must_use]
    pub const fn nanos(self) -> u32 {
        self.nanos
    }

    /// Struct table describing timestamps.
    #[must_use]
    pub fn struct_type() -> Rc<StructType> {
        StructType::cached(TIMESTAMP_IDENTITY, || {
            StructType::builder(TIMESTAMP_TYPE_NAME)
                .identity(TIMESTAMP_IDENTITY)
                .field(FieldDescriptor::new("secs", Type::Int(IntKind::I64)).private())
                .field(FieldDescriptor::new("nanos", Type::Uint(UintKind::U32)).private())
                .build()
        })
    }

    /// Encode as twelve big-endian bytes: seconds then nanoseconds.
    #[must_use]
    pub fn to_binary(self) -> [u8; BINARY_LEN] {
        let mut out = [0_u8; BINARY_LEN];
        out[..8].copy_from_slice(&self.secs.to_be_bytes());
        out[8..].copy_from_slice(&self.nanos.to_be_bytes());
        out
    }

    /// Decode the form produced by [`Timestamp::to_binary`].
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::ConversionFailed`] when `bytes` has the wrong
    /// length or the nanoseconds are out of range.
    pub fn from_binary(bytes: &[u8]) -> MorphResult<Self> {
        let invalid = || MorphError::ConversionFailed {
            from: format!("[{}]u8", bytes.len()),
            to: TIMESTAMP_TYPE_NAME.to_owned(),
        };
        let (secs, nanos) = bytes.split_at_checked(8).ok_or_else(invalid)?;
        let secs: [u8; 8] = secs.try_into().map_err(|_| invalid())?;
        let nanos: [u8; 4] = nanos.try_into().map_err(|_| invalid())?;
        let nanos = u32::from_be_bytes(nanos);
        if nanos >= 1_000_000_000 {
            return Err(invalid());
        }
        Ok(Self {
            secs: i64::from_be_bytes(secs),
            nanos,
        })
    }

    /// Reflect into a struct value.
    #[must_use]
    pub fn to_struct(self) -> StructValue {
        StructValue::new(
            Self::struct_type(),
            vec![
                Value::Int(self.secs, IntKind::I64),
                Value::Uint(u64::from(self.nanos), UintKind::U32),
            ],
        )
    }

    /// Read back from a struct value of the timestamp type.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::ConversionFailed`] when `value` is not a
    /// timestamp.
    pub fn from_struct(value: &StructValue) -> MorphResult<Self> {
        let invalid = || MorphError::ConversionFailed {
            from: value.struct_type().name().to_owned(),
            to: TIMESTAMP_TYPE_NAME.to_owned(),
        };
        if !value.struct_type().is_timestamp() {
            return Err(invalid());
        }
        match value.fields() {
            [Value::Int(secs, _), Value::Uint(nanos, _)] => {
                let nanos = u32::try_from(*nanos).map_err(|_| invalid())?;
                Ok(Self::new(*secs, nanos))
            }
            _ => Err(invalid()),
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::new(
                i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
                after.subsec_nanos(),
            ),
            Err(before) => {
                let before = before.duration();
                let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
                match before.subsec_nanos() {
                    0 => Self::new(-secs, 0),
                    nanos => Self::new(-secs - 1, 1_000_000_000 - nanos),
                }
            }
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        let nanos = Duration::from_nanos(u64::from(ts.nanos));
        if ts.secs >= 0 {
            UNIX_EPOCH + Duration::from_secs(ts.secs.unsigned_abs()) + nanos
        } else {
            UNIX_EPOCH - Duration::from_secs(ts.secs.unsigned_abs()) + nanos
        }
    }
}
