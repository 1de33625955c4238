/// Data layer: core types, CSV codec, and synthetic generation.
///
/// Architecture:
/// ```text
///   CSV bytes ◄───────────────┐
///        │                    │
///        ▼                    │
///   ┌──────────┐              │
///   │  codec    │  decode / encode
///   └──────────┘              │
///        │                    │
///        ▼                    │
///   ┌──────────┐         ┌───────────┐
///   │ Dataset   │ ◄────── │ synthetic  │  U(0,100) brightness + N(0,10) noise
///   └──────────┘         └───────────┘
/// ```

pub mod codec;
pub mod model;
pub mod synthetic;
