use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
    assert_eq!(Color::parse("#FF000080").unwrap(), Color::rgba(255, 0, 0, 128));
    assert_eq!(Color::parse("#1a2b3c").unwrap(), Color::rgb(0x1a, 0x2b, 0x3c));
    assert_eq!(Color::parse("#0f08").unwrap(), Color::rgba(0, 255, 0, 136));
    assert!(Color::parse("#12345").is_err());
    assert!(Color::parse("#zzzzzz").is_err());
}

#[test]
fn parses_functional_and_named_forms() {
    assert_eq!(
        Color::parse("rgba(0,0,0,0.25)").unwrap(),
        Color::rgba(0, 0, 0, 64)
    );
    assert_eq!(
        Color::parse("rgb( 12, 34, 56 )").unwrap(),
        Color::rgb(12, 34, 56)
    );
    assert_eq!(Color::parse("Red").unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(Color::parse("transparent").unwrap(), Color::TRANSPARENT);
    assert!(Color::parse("rgb(1,2)").is_err());
    assert!(Color::parse("chartreuse-ish").is_err());
}

#[test]
fn parses_full_css_name_table_and_hsl() {
    assert_eq!(Color::parse("darkred").unwrap(), Color::rgb(139, 0, 0));
    assert_eq!(Color::parse("DarkSlateGray").unwrap(), Color::rgb(47, 79, 79));
    assert_eq!(Color::parse("rebeccapurple").unwrap(), Color::rgb(102, 51, 153));
    assert_eq!(Color::parse("hsl(120, 100%, 50%)").unwrap(), Color::rgb(0, 255, 0));
}

#[test]
fn deserializes_from_string_or_array_and_serializes_as_hex() {
    let c: Color = serde_json::from_str("\"#336699\"").unwrap();
    assert_eq!(c, Color::rgb(0x33, 0x66, 0x99));

    let c: Color = serde_json::from_str("[1, 2, 3, 4]").unwrap();
    assert_eq!(c, Color::rgba(1, 2, 3, 4));

    assert!(serde_json::from_str::<Color>("[1, 2]").is_err());
    assert_eq!(
        serde_json::to_string(&Color::rgb(255, 0, 0)).unwrap(),
        "\"#ff0000ff\""
    );
}

#[test]
fn with_opacity_scales_alpha_only() {
    let c = Color::rgb(10, 20, 30).with_opacity(0.5);
    assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    assert_eq!(c.a, 128);
}
