//! uds-proto - UDS (ISO 14229) protocol core
//!
//! Bit-exact encoding and decoding of UDS application-layer messages,
//! request/response correlation and ECU state tracking. Transport framing
//! (ISO-TP, DoIP) is out of scope: every function here works on one fully
//! reassembled message buffer.
//!
//! # Architecture
//!
//! ```text
//!   bytes ──► codec::decode ──► UdsMessage ──► matcher::answers / hashret
//!               │                   │
//!               ▼                   ▼
//!          Registry            EcuStateMachine::apply
//!   (MessageShape per id)
//!               │
//!   FieldSpec + Presence (layout) ──► FieldCodec
//! ```
//!
//! ```
//! use uds_proto::{decode, encode, UdsMessage};
//!
//! let request = UdsMessage::new(0x10).with("diagnosticSessionType", 0x02u8);
//! assert_eq!(&encode(&request).unwrap()[..], &[0x10, 0x02]);
//!
//! let response = decode(&[0x50, 0x02]).unwrap();
//! assert!(uds_proto::answers(&response, &request));
//! ```

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod matcher;
pub mod message;
pub mod nrc;
pub mod registry;
pub mod state;

pub use codec::{decode, decode_with, encode, encode_with, Condition, FieldCodec, FieldSpec};
pub use config::ProtocolConfig;
pub use error::{CodecError, RegistryError};
pub use matcher::{answers, answers_with, hashret, ResponseMatcher};
pub use message::{FieldMap, FieldValue, UdsMessage};
pub use nrc::NegativeResponseCode;
pub use registry::{Direction, MessageShape, NameTables, Registry, ServiceKind};
pub use state::{EcuState, EcuStateMachine};
