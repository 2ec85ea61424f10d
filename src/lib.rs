//! Codec for the IAB Global Privacy Platform (GPP)
//! [consent string](https://github.com/InteractiveAdvertisingBureau/Global-Privacy-Platform).
//!
//! A GPP string packages one or more regional privacy sections into a
//! single transport-safe string. This crate decodes such strings into
//! typed sections and encodes section lists back into strings that any
//! conformant decoder can read.
//!
//! NOTE: This is not an official IAB library.
//!
//! # Parsing GPP strings
//!
//! A GPP consent string is made of a mandatory header and a list of
//! optional sections. [`v1::GPPContainer`] decodes all of them at once,
//! collecting per-section errors instead of giving up on the whole string:
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use gpp_codec::v1::GPPContainer;
//!
//! let s = "DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN";
//! let (container, errors) = GPPContainer::parse(s)?;
//!
//! assert!(errors.is_empty());
//! for section in &container.sections {
//!     println!("section {}: {}", section.id(), section.value());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! When only some sections matter, [`v1::GPPString`] keeps the raw
//! payloads around and decodes on demand:
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use gpp_codec::sections::Section;
//! use gpp_codec::v1::GPPString;
//!
//! let gpp = GPPString::parse_str("DBABBgA~xlgWEYCZAA")?;
//!
//! if let Section::UsCa(ca) = gpp.decode_section(8)? {
//!     println!("opted out of sale: {}", ca.core.sale_opt_out == 1);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Encoding GPP strings
//!
//! [`v1::encode`] assembles a canonical string from any list of sections;
//! the result is independent of the input order:
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use gpp_codec::sections::{GenericSection, Section};
//! use gpp_codec::v1::encode;
//!
//! let s = encode(&[Section::Generic(GenericSection::new(6, "1YNN"))])?;
//! assert_eq!(s, "DBABTA~1YNN");
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! Header problems abort parsing, since without the header the section
//! payloads cannot be attributed. Individual section problems do not: the
//! affected section is kept as an opaque passthrough and reported
//! alongside the container, so corrupted strings still yield whatever
//! consent information they carry.
//!
pub mod core;
pub mod sections;
pub mod v1;
