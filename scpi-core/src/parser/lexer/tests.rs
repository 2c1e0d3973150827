use super::{Lexer, Token};

extern crate std;

#[test]
fn test_whitespace() {
    let mut lexer = Lexer::new(b" \t x");
    assert_eq!(lexer.whitespace(), 2);
    assert_eq!(lexer.whitespace(), 0);
    assert_eq!(lexer.pos(), 2);
    // Newline is a terminator, not whitespace
    let mut lexer = Lexer::new(b"\n");
    assert_eq!(lexer.whitespace(), 0);
}

#[test]
fn test_newline() {
    let mut lexer = Lexer::new(b"\r\nrest");
    assert!(lexer.newline());
    assert_eq!(lexer.pos(), 2);
    assert!(Lexer::new(b"\n").newline());
    // A lone carriage return is not a terminator
    let mut lexer = Lexer::new(b"\rx");
    assert!(!lexer.newline());
    assert_eq!(lexer.pos(), 0);
}

#[test]
fn test_program_header() {
    assert_eq!(
        Lexer::new(b"*IDN?").program_header(),
        Some(b"*IDN?".as_slice())
    );
    assert_eq!(
        Lexer::new(b"MEAS:VOLT:DC? 1").program_header(),
        Some(b"MEAS:VOLT:DC?".as_slice())
    );
    assert_eq!(
        Lexer::new(b":SYSTem:ERRor:NEXT?").program_header(),
        Some(b":SYSTem:ERRor:NEXT?".as_slice())
    );
    assert_eq!(
        Lexer::new(b"CONF:CHAN5?").program_header(),
        Some(b"CONF:CHAN5?".as_slice())
    );
    // Common commands take exactly one mnemonic
    assert_eq!(
        Lexer::new(b"*RST;").program_header(),
        Some(b"*RST".as_slice())
    );
    // Failures leave the cursor untouched
    let mut lexer = Lexer::new(b"1234");
    assert_eq!(lexer.program_header(), None);
    assert_eq!(lexer.pos(), 0);
    assert_eq!(Lexer::new(b"*").program_header(), None);
    // A dangling colon is left for the caller to reject
    let mut lexer = Lexer::new(b"MEAS:");
    assert_eq!(lexer.program_header(), Some(b"MEAS".as_slice()));
    assert_eq!(lexer.pos(), 4);
}

#[test]
fn test_character_data() {
    assert_eq!(
        Lexer::new(b"CHARacter4, pperg").character_data(),
        Some(Token::ProgramMnemonic(b"CHARacter4"))
    );
    assert_eq!(Lexer::new(b"1CHAR").character_data(), None);
    assert_eq!(
        Lexer::new(b"_priv").character_data(),
        Some(Token::ProgramMnemonic(b"_priv"))
    );
}

#[test]
fn test_decimal_numeric() {
    assert_eq!(
        Lexer::new(b"25").decimal_numeric(),
        Some(Token::DecimalNumeric(b"25"))
    );
    assert_eq!(
        Lexer::new(b".2").decimal_numeric(),
        Some(Token::DecimalNumeric(b".2"))
    );
    assert_eq!(
        Lexer::new(b"1.").decimal_numeric(),
        Some(Token::DecimalNumeric(b"1."))
    );
    assert_eq!(
        Lexer::new(b"-1.3E+2,").decimal_numeric(),
        Some(Token::DecimalNumeric(b"-1.3E+2"))
    );
    assert_eq!(
        Lexer::new(b"+25e1").decimal_numeric(),
        Some(Token::DecimalNumeric(b"+25e1"))
    );
    // Malformed numerics are not consumed
    let mut lexer = Lexer::new(b".");
    assert_eq!(lexer.decimal_numeric(), None);
    assert_eq!(lexer.pos(), 0);
    assert_eq!(Lexer::new(b"1E").decimal_numeric(), None);
    assert_eq!(Lexer::new(b"-x").decimal_numeric(), None);
}

#[test]
fn test_decimal_numeric_suffix() {
    assert_eq!(
        Lexer::new(b"1.0V").decimal_numeric(),
        Some(Token::DecimalNumericWithSuffix(b"1.0", b"V"))
    );
    assert_eq!(
        Lexer::new(b"25 MHZ,").decimal_numeric(),
        Some(Token::DecimalNumericWithSuffix(b"25", b"MHZ"))
    );
    assert_eq!(
        Lexer::new(b"9.81 m.s-2").decimal_numeric(),
        Some(Token::DecimalNumericWithSuffix(b"9.81", b"m.s-2"))
    );
    assert_eq!(
        Lexer::new(b"10 /s").decimal_numeric(),
        Some(Token::DecimalNumericWithSuffix(b"10", b"/s"))
    );
    // Whitespace before a non-suffix is left in place
    let mut lexer = Lexer::new(b"1 ,2");
    assert_eq!(lexer.decimal_numeric(), Some(Token::DecimalNumeric(b"1")));
    assert_eq!(lexer.pos(), 1);
}

#[test]
fn test_nondecimal_numeric() {
    assert_eq!(
        Lexer::new(b"#HC0FFEE").nondecimal_numeric(),
        Some(Token::HexNumeric(b"C0FFEE"))
    );
    assert_eq!(
        Lexer::new(b"#h1f,").nondecimal_numeric(),
        Some(Token::HexNumeric(b"1f"))
    );
    assert_eq!(
        Lexer::new(b"#Q17").nondecimal_numeric(),
        Some(Token::OctNumeric(b"17"))
    );
    assert_eq!(
        Lexer::new(b"#B10110").nondecimal_numeric(),
        Some(Token::BinNumeric(b"10110"))
    );
    // Octal digits stop at 8/9
    assert_eq!(
        Lexer::new(b"#q178").nondecimal_numeric(),
        Some(Token::OctNumeric(b"17"))
    );
    let mut lexer = Lexer::new(b"#H");
    assert_eq!(lexer.nondecimal_numeric(), None);
    assert_eq!(lexer.pos(), 0);
    // Arbitrary block prefix is not a nondecimal numeric
    assert_eq!(Lexer::new(b"#216AB").nondecimal_numeric(), None);
}

#[test]
fn test_string_data() {
    assert_eq!(
        Lexer::new(b"'hello', rest").string_data(),
        Some(Token::SingleQuoteString(b"'hello'"))
    );
    assert_eq!(
        Lexer::new(b"\"hello\"").string_data(),
        Some(Token::DoubleQuoteString(b"\"hello\""))
    );
    // Embedded quotes escaped by doubling stay in the raw slice
    assert_eq!(
        Lexer::new(b"'it''s'").string_data(),
        Some(Token::SingleQuoteString(b"'it''s'"))
    );
    assert_eq!(
        Lexer::new(b"\"a\"\"b\"x").string_data(),
        Some(Token::DoubleQuoteString(b"\"a\"\"b\""))
    );
    // Unterminated
    let mut lexer = Lexer::new(b"'oops");
    assert_eq!(lexer.string_data(), None);
    assert_eq!(lexer.pos(), 0);
}

#[test]
fn test_string_inner() {
    let tok = Lexer::new(b"'it''s'").string_data().unwrap();
    assert_eq!(tok.string_inner(), Some(b"it''s".as_slice()));
}

#[test]
fn test_arbitrary_block() {
    assert_eq!(
        Lexer::new(b"#204abcd,").arbitrary_block(),
        Some(Token::ArbitraryBlock(b"abcd"))
    );
    // Payload may contain separators and terminators
    assert_eq!(
        Lexer::new(b"#15;,\n\x00x").arbitrary_block(),
        Some(Token::ArbitraryBlock(b";,\n\x00"))
    );
    // Short payload is not consumed, more bytes may arrive later
    let mut lexer = Lexer::new(b"#216AB");
    assert_eq!(lexer.arbitrary_block(), None);
    assert_eq!(lexer.pos(), 0);
    // Length digits must all be present
    assert_eq!(Lexer::new(b"#3").arbitrary_block(), None);
    assert_eq!(Lexer::new(b"#2a0x").arbitrary_block(), None);
    // Indefinite form is not supported
    assert_eq!(Lexer::new(b"#0abc\n").arbitrary_block(), None);
}

#[test]
fn test_expression_data() {
    assert_eq!(
        Lexer::new(b"(@1,2:3)").expression_data(),
        Some(Token::Expression(b"@1,2:3"))
    );
    assert_eq!(
        Lexer::new(b"()").expression_data(),
        Some(Token::Expression(b""))
    );
    assert_eq!(Lexer::new(b"(1").expression_data(), None);
    assert_eq!(Lexer::new(b"(a;b)").expression_data(), None);
    assert_eq!(Lexer::new(b"((1))").expression_data(), None);
}

#[test]
fn test_program_data_order() {
    // Nondecimal before block, character before decimal
    assert_eq!(
        Lexer::new(b" #HFF ").program_data(),
        Some(Token::HexNumeric(b"FF"))
    );
    assert_eq!(
        Lexer::new(b"MAXimum").program_data(),
        Some(Token::ProgramMnemonic(b"MAXimum"))
    );
    let mut lexer = Lexer::new(b" 1.25 , 3");
    assert_eq!(lexer.program_data(), Some(Token::DecimalNumeric(b"1.25")));
    // Trailing whitespace is consumed up to the separator
    assert!(lexer.comma());
}

#[test]
fn test_suffix_accessor() {
    let tok = Lexer::new(b"1.0 V").decimal_numeric().unwrap();
    assert_eq!(tok.suffix(), Some(b"V".as_slice()));
    assert_eq!(Token::DecimalNumeric(b"1.0").suffix(), None);
}

#[test]
fn test_is_numeric() {
    assert!(Token::DecimalNumeric(b"1").is_numeric(false));
    assert!(Token::HexNumeric(b"1").is_numeric(false));
    assert!(Token::DecimalNumericWithSuffix(b"1", b"V").is_numeric(true));
    assert!(!Token::DecimalNumericWithSuffix(b"1", b"V").is_numeric(false));
    assert!(!Token::ProgramMnemonic(b"MAX").is_numeric(true));
}
