//! Enums mappable to and from SCPI mnemonics, used for choice parameters.

#[doc(no_inline)]
pub use scpi_core_derive::ScpiEnum;

/// A finite set of choices identified by SCPI mnemonics.
///
/// Usually derived:
/// ```
/// use scpi_core::option::ScpiEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, ScpiEnum)]
/// enum TriggerSource {
///     #[scpi(mnemonic = b"BUS")]
///     Bus,
///     #[scpi(mnemonic = b"IMMediate")]
///     Immediate,
///     #[scpi(mnemonic = b"EXTernal")]
///     External,
/// }
///
/// assert_eq!(TriggerSource::from_mnemonic(b"imm"), Some(TriggerSource::Immediate));
/// assert_eq!(TriggerSource::from_mnemonic(b"IMMEDIATE"), Some(TriggerSource::Immediate));
/// assert_eq!(TriggerSource::from_mnemonic(b"immed"), None);
/// assert_eq!(TriggerSource::External.short_form(), b"EXT");
/// ```
///
/// The derive also provides `TryFrom<Token>` so a choice can be extracted
/// with [crate::parser::CommandCall::next_data]; a mnemonic outside the
/// set raises `IllegalParameterValue`.
pub trait ScpiEnum: Sized {
    /// Match a mnemonic (short or long form, case-insensitive) to a
    /// variant.
    fn from_mnemonic(s: &[u8]) -> Option<Self>;

    /// The variant's mnemonic in `UPPERlower` pattern form
    fn mnemonic(&self) -> &'static [u8];

    /// The short form of the mnemonic, suitable for response data
    fn short_form(&self) -> &'static [u8] {
        let mnemonic = self.mnemonic();
        let len = mnemonic
            .iter()
            .position(|c| !c.is_ascii_uppercase())
            .unwrap_or(mnemonic.len());
        &mnemonic[..len]
    }
}
