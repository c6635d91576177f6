use proptest::prelude::*;

use crate::token::{Token, TokenKind, Tokenizer, tokenize};

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

fn pairs(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
    tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
}

fn reconstruct(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn basic() {
    let tokens = Tokenizer::tokenize_significant(r#"ruleset hello { meta { name "Hello" } }"#);
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::Symbol, "ruleset"),
            (TokenKind::Symbol, "hello"),
            (TokenKind::Symbol, "meta"),
            (TokenKind::Symbol, "name"),
            (TokenKind::String, "\"Hello\""),
        ]
    );
}

#[test]
fn test_empty_input() {
    assert!(Tokenizer::tokenize_full("").is_empty());
    assert!(Tokenizer::tokenize_significant("").is_empty());
}

#[test]
fn test_whitespace_is_one_token() {
    let tokens = Tokenizer::tokenize_full(" \t\n\r\n x");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Whitespace, " \t\n\r\n "), (TokenKind::Symbol, "x")]);
}

#[test]
fn test_offsets_are_char_indices() {
    let tokens = Tokenizer::tokenize_full("\"é\" a");
    assert_eq!((tokens[0].start, tokens[0].end), (0, 3));
    assert_eq!((tokens[2].start, tokens[2].end), (4, 5));
}

#[test]
fn test_suppressed_tokens_keep_offsets() {
    let tokens = Tokenizer::tokenize_significant("a = 1");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Symbol, "a"), (TokenKind::Number, "1")]);
    assert_eq!(tokens[1].start, 4);
}

#[test]
fn test_line_comment_includes_terminator() {
    let tokens = Tokenizer::tokenize_full("// hi\nx");
    assert_eq!(pairs(&tokens), vec![(TokenKind::LineComment, "// hi\n"), (TokenKind::Symbol, "x")]);

    let tokens = Tokenizer::tokenize_full("x // trailing");
    assert_eq!(tokens.last().map(|t| (t.kind, t.text.as_str())), Some((TokenKind::LineComment, "// trailing")));
}

#[test]
fn test_block_comment() {
    let tokens = Tokenizer::tokenize_full("/* a\n b */x");
    assert_eq!(pairs(&tokens), vec![(TokenKind::BlockComment, "/* a\n b */"), (TokenKind::Symbol, "x")]);

    let tokens = Tokenizer::tokenize_full("/**/");
    assert_eq!(pairs(&tokens), vec![(TokenKind::BlockComment, "/**/")]);
}

#[test]
fn test_block_comment_slash_star_slash_is_not_closed() {
    let tokens = Tokenizer::tokenize_full("/*/");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Illegal, "/*/")]);
}

#[test]
fn test_unterminated_block_comment() {
    let tokens = Tokenizer::tokenize_full("a /* never closed");
    assert_eq!(tokens.last().map(|t| (t.kind, t.text.as_str())), Some((TokenKind::Illegal, "/* never closed")));
}

#[test]
fn test_number_dot_disambiguation() {
    let tokens = Tokenizer::tokenize_full("3.foo");
    assert_eq!(
        pairs(&tokens),
        vec![(TokenKind::Number, "3"), (TokenKind::Raw, "."), (TokenKind::Symbol, "foo")]
    );

    let tokens = Tokenizer::tokenize_full("3.14");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Number, "3.14")]);
}

#[test]
fn test_leading_dot_number() {
    let tokens = Tokenizer::tokenize_full(".5+x.y");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::Number, ".5"),
            (TokenKind::Raw, "+"),
            (TokenKind::Symbol, "x"),
            (TokenKind::Raw, "."),
            (TokenKind::Symbol, "y"),
        ]
    );
}

#[test]
fn test_number_with_two_dots() {
    let tokens = Tokenizer::tokenize_full("1.2.3");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Number, "1.2"), (TokenKind::Number, ".3")]);
}

#[test]
fn test_string_escapes() {
    let tokens = Tokenizer::tokenize_full(r#""a\"b" c"#);
    assert_eq!(pairs(&tokens)[0], (TokenKind::String, r#""a\"b""#));

    let tokens = Tokenizer::tokenize_full(r#""a\\" c"#);
    assert_eq!(pairs(&tokens)[0], (TokenKind::String, r#""a\\""#));
}

#[test]
fn test_unterminated_string() {
    let tokens = Tokenizer::tokenize_full("x = \"abc");
    assert_eq!(tokens.last().map(|t| (t.kind, t.text.as_str())), Some((TokenKind::Illegal, "\"abc")));
}

#[test]
fn test_regexp_literals() {
    let tokens = Tokenizer::tokenize_significant("re#^a\\#b# re#x#i re#y#gi re#z#ig re#w#g");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::Regexp, "re#^a\\#b#"),
            (TokenKind::Regexp, "re#x#i"),
            (TokenKind::Regexp, "re#y#gi"),
            (TokenKind::Regexp, "re#z#ig"),
            (TokenKind::Regexp, "re#w#g"),
        ]
    );
}

#[test]
fn test_regexp_flags_stop_at_identifier() {
    let tokens = Tokenizer::tokenize_significant("re#a#ix");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Regexp, "re#a#i"), (TokenKind::Symbol, "x")]);
}

#[test]
fn test_unterminated_regexp() {
    let tokens = Tokenizer::tokenize_full("re#abc");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Illegal, "re#abc")]);
}

#[test]
fn test_symbols() {
    let tokens = Tokenizer::tokenize_significant("$x _y9 rex re");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::Symbol, "$x"),
            (TokenKind::Symbol, "_y9"),
            (TokenKind::Symbol, "rex"),
            (TokenKind::Symbol, "re"),
        ]
    );
}

#[test]
fn punctuations() {
    let tokens = tokenize("<=> <= < || | == => = := >= >< > && != ( ) { } [ ] , / . - % + ; *", false, true);
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "<=>", "<=", "<", "||", "|", "==", "=>", "=", ":=", ">=", "><", ">", "&&", "!=", "(", ")", "{", "}", "[",
            "]", ",", "/", ".", "-", "%", "+", ";", "*",
        ]
    );
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Raw));
}

#[test]
fn test_unknown_characters_are_illegal() {
    let tokens = Tokenizer::tokenize_full("§§§");
    assert_eq!(
        pairs(&tokens),
        vec![(TokenKind::Illegal, "§"), (TokenKind::Illegal, "§"), (TokenKind::Illegal, "§")]
    );

    let tokens = Tokenizer::tokenize_full("a # 'b'");
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Illegal && t.text == "#"));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Illegal && t.text == "'"));
}

#[test]
fn test_chevron_plain() {
    let tokens = Tokenizer::tokenize_full("<<hello world>>");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::ChevronOpen, "<<"),
            (TokenKind::ChevronString, "hello world"),
            (TokenKind::ChevronClose, ">>"),
        ]
    );
}

#[test]
fn test_chevron_empty() {
    let tokens = Tokenizer::tokenize_full("<<>>");
    assert_eq!(kinds(&tokens), vec![TokenKind::ChevronOpen, TokenKind::ChevronClose]);
}

#[test]
fn test_chevron_escaped_close() {
    let tokens = Tokenizer::tokenize_full(r"<<a\>>b>>");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::ChevronOpen, "<<"),
            (TokenKind::ChevronString, r"a\>>b"),
            (TokenKind::ChevronClose, ">>"),
        ]
    );
}

#[test]
fn test_chevron_interpolation_with_nested_braces() {
    let tokens = Tokenizer::tokenize_full("<<a#{ {x:1} }b>>");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::ChevronOpen, "<<"),
            (TokenKind::ChevronString, "a"),
            (TokenKind::ChevronBeestingOpen, "#{"),
            (TokenKind::Whitespace, " "),
            (TokenKind::Raw, "{"),
            (TokenKind::Symbol, "x"),
            (TokenKind::Raw, ":"),
            (TokenKind::Number, "1"),
            (TokenKind::Raw, "}"),
            (TokenKind::Whitespace, " "),
            (TokenKind::ChevronBeestingClose, "}"),
            (TokenKind::ChevronString, "b"),
            (TokenKind::ChevronClose, ">>"),
        ]
    );
}

#[test]
fn test_nested_templates() {
    let tokens = Tokenizer::tokenize_significant("<<x#{<<y#{z}>>}w>>");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::ChevronOpen, "<<"),
            (TokenKind::ChevronString, "x"),
            (TokenKind::ChevronBeestingOpen, "#{"),
            (TokenKind::ChevronOpen, "<<"),
            (TokenKind::ChevronString, "y"),
            (TokenKind::ChevronBeestingOpen, "#{"),
            (TokenKind::Symbol, "z"),
            (TokenKind::ChevronBeestingClose, "}"),
            (TokenKind::ChevronClose, ">>"),
            (TokenKind::ChevronBeestingClose, "}"),
            (TokenKind::ChevronString, "w"),
            (TokenKind::ChevronClose, ">>"),
        ]
    );
}

#[test]
fn test_beesting_opens_and_closes_balance() {
    let tokens = Tokenizer::tokenize_significant("<<#{a}#{ {b:{c:1}} }#{<<#{d}>>}>>");
    let mut depth = 0i32;
    for t in &tokens {
        match t.kind {
            TokenKind::ChevronBeestingOpen => depth += 1,
            TokenKind::ChevronBeestingClose => {
                depth -= 1;
                assert!(depth >= 0);
            }
            _ => {}
        }
    }
    assert_eq!(depth, 0);
}

#[test]
fn test_brace_outside_template_is_raw() {
    let tokens = Tokenizer::tokenize_full("}");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Raw, "}")]);
}

#[test]
fn test_unterminated_chevron() {
    let tokens = Tokenizer::tokenize_full("<<abc");
    assert_eq!(pairs(&tokens), vec![(TokenKind::ChevronOpen, "<<"), (TokenKind::Illegal, "abc")]);

    let tokens = Tokenizer::tokenize_full("<<");
    assert_eq!(pairs(&tokens), vec![(TokenKind::ChevronOpen, "<<")]);
}

#[test]
fn test_token_kind_names() {
    assert_eq!(TokenKind::ChevronBeestingOpen.as_str(), "CHEVRON-BEESTING-OPEN");
    assert_eq!(
        serde_json::to_string(&TokenKind::LineComment).unwrap(),
        "\"LINE-COMMENT\""
    );
}

#[test]
fn test_reconstructs_realistic_ruleset() {
    let src = r#"ruleset io.picolabs.hello {
  meta {
    name "Hello" // display name
    shares hello
  }
  global {
    hello = function(obj){
      msg = <<Hello #{obj.defaultsTo("world")}!>>;
      msg.uc()
    }
    pattern = re#^\d+\.\d+#gi
  }
  rule say_hello {
    select when echo hello
    /* no-op */
    send_directive("say", {"something": hello(3.14)})
  }
}
"#;
    let tokens = Tokenizer::tokenize_full(src);
    assert_eq!(reconstruct(&tokens), src);
    assert!(tokens.iter().all(|t| t.kind != TokenKind::Illegal));
}

proptest! {
    #[test]
    fn prop_full_tokenize_reconstructs_input(src in "\\PC{0,64}") {
        let tokens = Tokenizer::tokenize_full(&src);
        prop_assert_eq!(reconstruct(&tokens), src);
    }

    #[test]
    fn prop_spans_are_contiguous(src in "[a-z0-9 <>#{}\"\\\\./*re]{0,48}") {
        let tokens = Tokenizer::tokenize_full(&src);
        let mut next = 0usize;
        for t in &tokens {
            prop_assert_eq!(t.start, next);
            prop_assert!(t.end > t.start);
            prop_assert_eq!(t.end - t.start, t.text.chars().count());
            next = t.end;
        }
        prop_assert_eq!(next, src.chars().count());
    }

    #[test]
    fn prop_filtered_stream_is_subsequence(src in "[a-z0-9 =+(){}<>#\"]{0,48}") {
        let full = Tokenizer::tokenize_full(&src);
        let significant = Tokenizer::tokenize_significant(&src);
        let expected: Vec<Token> = full
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace && t.kind != TokenKind::Raw)
            .collect();
        prop_assert_eq!(significant, expected);
    }
}
