mod rs256;

pub use rs256::{RsaKeyParseError, RsaKeyParser, Rs256PrivateKey, RsaSignError};
