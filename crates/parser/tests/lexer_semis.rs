//! Automatic `;` insertion as the declaration parser sees it.

use goimpl_parser::lexer::{tokenize, Lexer, Tok};

/// Source text of the token each inserted `;` follows.
fn line_ends(src: &str) -> Vec<&str> {
    let mut prev = "";
    let mut out = Vec::new();
    for (start, tok, end) in Lexer::new(src) {
        match tok {
            Tok::Semi if start == end => out.push(prev),
            _ => prev = &src[start..end],
        }
    }
    out
}

fn inserted_at(src: &str) -> Vec<usize> {
    Lexer::new(src)
        .filter(|(start, tok, end)| *tok == Tok::Semi && start == end)
        .map(|(start, _, _)| start)
        .collect()
}

#[test]
fn each_interface_member_ends_a_line() {
    let src = "type I interface {\n\tRead(p []byte) (n int, err error)\n\tio.Closer\n}\n";
    assert_eq!(line_ends(src), [")", "Closer", "}"]);
}

#[test]
fn open_parameter_lists_span_lines() {
    assert_eq!(line_ends("func f(\n\ta int,\n\tb string,\n) error\n"), ["error"]);
    assert_eq!(line_ends("func g(a int) (\n\tn int,\n)\n"), [")"]);
}

#[test]
fn skipped_bodies_stay_balanced() {
    let src = "func (t T) M() {\n\tif x {\n\t\treturn\n\t}\n\tx++\n}\n";
    assert_eq!(line_ends(src), ["return", "}", "++", "}"]);
    let (toks, diags) = tokenize(src);
    assert!(diags.is_empty());
    let opens = toks.iter().filter(|(_, t, _)| *t == Tok::LBrace).count();
    let closes = toks.iter().filter(|(_, t, _)| *t == Tok::RBrace).count();
    assert_eq!((opens, closes), (2, 2));
}

#[test]
fn block_comments_break_lines_only_when_they_span_one() {
    let src = "Read() /* a\n b */ Close()";
    assert_eq!(line_ends(src), [")", ")"]);
    assert_eq!(inserted_at(src), [src.find('\n').unwrap(), src.len()]);

    assert_eq!(line_ends("Read() /* a */ Close()\n"), [")"]);
    // `{` never takes a `;`, comment or not
    assert_eq!(line_ends("type I interface { /*\n*/ M() }"), ["}"]);
}

#[test]
fn line_comments_end_at_the_newline() {
    let src = "\tClose() error // closes the stream\n";
    assert_eq!(line_ends(src), ["error"]);
    assert_eq!(inserted_at(src), [src.len() - 1]);
}

#[test]
fn end_of_input_closes_the_last_line() {
    assert_eq!(inserted_at("package p"), [9]);
    assert_eq!(line_ends("type T struct{}"), ["}"]);
    assert_eq!(line_ends("var xs []int"), ["int"]);
    assert!(line_ends("func f(").is_empty());
}

#[test]
fn written_semicolons_are_not_doubled() {
    let src = "type A int; type B int\n";
    assert_eq!(line_ends(src), ["int"]);
    let semis = Lexer::new(src).filter(|(_, t, _)| *t == Tok::Semi).count();
    assert_eq!(semis, 2);
}

#[test]
fn unterminated_comment_ends_without_a_semicolon() {
    let (toks, diags) = tokenize("type I interface {\n\tM() /* x");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "unterminated comment");
    assert!(matches!(toks.last(), Some((_, Tok::Error, _))));
}
