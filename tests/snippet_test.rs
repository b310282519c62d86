use odb_devtools::errors::DevtoolsError;
use odb_devtools::locator::{find_marker, split_lines};
use odb_devtools::snippet::extract;

fn snippet_at(content: &str, line: usize) -> Result<odb_devtools::Snippet, DevtoolsError> {
    let lines = split_lines(content);
    let marker = find_marker(&lines, line)?;
    extract(&lines, &marker)
}

#[test]
fn test_multiline_snippet_after_filename_argument() {
    let content = r##"TEST_F(NAME, bool_constant)
{
    ast = driver->parse("test",
        "#constant mybool1 true\n"
        "#constant mybool2 false\n",
        matcher);
}
"##;
    let snippet = snippet_at(content, 2).unwrap();
    assert_eq!(snippet.text, "#constant mybool1 true\n#constant mybool2 false\n");
    assert_eq!(snippet.start_line, 4);
    assert_eq!(snippet.end_line, 5);
}

#[test]
fn test_multiline_snippet_with_trailing_call_syntax() {
    let content = r##"TEST_F(NAME, string_constant)
{
    ASSERT_THAT(driver->parseString(
        "#constant mystring \"hello world!\"\n"
        "print mystring\n"), IsTrue());
}
"##;
    let snippet = snippet_at(content, 3).unwrap();
    assert_eq!(
        snippet.text,
        "#constant mystring \"hello world!\"\nprint mystring\n"
    );
}

#[test]
fn test_single_line_snippet() {
    let content = r##"TEST_F(NAME, integer_constant)
{
    EXPECT_THAT(driver->parseString("#constant myint 20\n"), IsTrue());
}
"##;
    let snippet = snippet_at(content, 3).unwrap();
    assert_eq!(snippet.text, "#constant myint 20\n");
    assert_eq!(snippet.start_line, 3);
    assert_eq!(snippet.end_line, 3);
}

#[test]
fn test_adjacent_literals_on_one_line_are_joined() {
    let content = "TEST(Lexer, adjacent)\n{\n    \"a = 1\\n\" \"b = 2\\n\",\n}\n";
    let snippet = snippet_at(content, 1).unwrap();
    assert_eq!(snippet.text, "a = 1\nb = 2\n");
}

#[test]
fn test_only_first_run_of_literals_is_used() {
    let content = r##"TEST_F(NAME, two_parses)
{
    EXPECT_THAT(driver->parseString(
        "#constant fail1 true false\n"), IsFalse());
    EXPECT_THAT(driver->parseString(
        "#constant fail2 23 3.4\n"), IsFalse());
}
"##;
    let snippet = snippet_at(content, 6).unwrap();
    assert_eq!(snippet.text, "#constant fail1 true false\n");
}

#[test]
fn test_search_stops_at_next_test() {
    let content = r##"TEST_F(NAME, no_source)
{
    ASSERT_THAT(1, Eq(1));
}

TEST_F(NAME, has_source)
{
    driver->parseString(
        "print 1\n");
}
"##;
    let result = snippet_at(content, 3);
    match result {
        Err(DevtoolsError::SnippetNotFound(id)) => assert_eq!(id, "NAME__no_source"),
        other => panic!("expected SnippetNotFound, got {:?}", other),
    }
}

#[test]
fn test_unterminated_literal_is_error() {
    let content = "TEST(S, broken)\n{\n    \"print 1\\n\n}\n";
    let result = snippet_at(content, 2);
    assert!(matches!(
        result,
        Err(DevtoolsError::MalformedLiteral { line: 3 })
    ));
}

#[test]
fn test_first_fragment_on_call_line_is_kept() {
    let content = r##"TEST_F(NAME, for_loop)
{
    ASSERT_THAT(
        parse("for n=1 to 5\n"
              "    print 5\n"
              "next n\n"),
        Eq(0));
}
"##;
    let snippet = snippet_at(content, 2).unwrap();
    assert_eq!(snippet.text, "for n=1 to 5\n    print 5\nnext n\n");
    assert_eq!(snippet.start_line, 4);
    assert_eq!(snippet.end_line, 6);
}

#[test]
fn test_single_statement_without_newline() {
    let content = r##"TEST_F(NAME, empty_list)
{
    EXPECT_THAT(parse("RANDOMIZE"), Eq(-1));
}
"##;
    let snippet = snippet_at(content, 3).unwrap();
    assert_eq!(snippet.text, "RANDOMIZE");
    assert_eq!(snippet.start_line, 3);
}

#[test]
fn test_single_statement_after_filename_argument() {
    let content = r##"TEST(Parser, one_liner)
{
    ast = driver->parse("test", "print \"x\"", matcher);
}
"##;
    let snippet = snippet_at(content, 2).unwrap();
    assert_eq!(snippet.text, "print \"x\"");
}

#[test]
fn test_stray_quote_in_comment_does_not_abort() {
    let content = r##"TEST_F(NAME, after_comment)
{
    /* the "quote
       ends here */
    EXPECT_THAT(parse("print 1\n"), Eq(0));
}
"##;
    let snippet = snippet_at(content, 2).unwrap();
    assert_eq!(snippet.text, "print 1\n");
    assert_eq!(snippet.start_line, 5);
}
