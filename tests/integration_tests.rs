// Parser robustness suite for Tern
//
// Table-driven cases grouped into suites. Each case either parses or fails
// with a message fragment; panics are caught and reported as crashes.

use tern::error::TernError;
use tern::lexer::tokenize;
use tern::parser::parse;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite
    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);

        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

/// Results for a test suite run
#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  ✗ {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  💥 {}: CRASHED - {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    let result = std::panic::catch_unwind(|| parse_input(&test.input));

    match result {
        Ok(parse_result) => match (parse_result, test.should_succeed) {
            (Ok(_), true) => TestResult::Pass,
            (Ok(_), false) => {
                TestResult::Fail("Expected parsing to fail, but it succeeded".to_string())
            }
            (Err(error), false) => match &test.expected_error_contains {
                Some(expected) if !error.message.contains(expected) => TestResult::Fail(format!(
                    "Error message '{}' doesn't contain expected text '{}'",
                    error.message, expected
                )),
                _ => TestResult::Pass,
            },
            (Err(error), true) => TestResult::Fail(format!(
                "Expected parsing to succeed, but got error: {}",
                error.message
            )),
        },
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

/// Tokenize and parse input
fn parse_input(input: &str) -> Result<tern::ast::Program, TernError> {
    let tokens = tokenize(input)?;
    parse(tokens)
}

impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_malformed_expressions_tests() -> TestSuite {
    let mut suite = TestSuite::new("Malformed Expressions");

    // === PARENTHESES TESTS ===

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren",
        "(1 + 2",
        "Expected ')' after expression",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren_nested",
        "((1 + 2)",
        "Expected ')' after expression",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren",
        "1 + 2)",
        "Unexpected token ')'",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses",
        "()",
        "Empty parentheses are not allowed",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses_in_expression",
        "1 + ()",
        "Empty parentheses are not allowed",
    ));

    // === BRACE TESTS ===

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_brace",
        "{ x: 1",
        "Expected '}' after object properties",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_brace",
        "x = 1 }",
        "Unexpected token '}'",
    ));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    suite.add_test(TestCase::should_succeed("empty_input", ""));
    suite.add_test(TestCase::should_succeed("only_whitespace", "   \n\t  "));

    suite.add_test(TestCase::should_fail_with_message(
        "unexpected_eof_after_operator",
        "1 +",
        "Expected expression after '+'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unexpected_eof_in_expression",
        "1 + (",
        "Unexpected end of input",
    ));

    let deep_parens = "(".repeat(100) + "1" + &")".repeat(100);
    suite.add_test(TestCase::should_succeed("deeply_nested_parens", &deep_parens));

    suite.add_test(TestCase::should_succeed(
        "optional_semicolons",
        "let x = 1; x + 1; let y;",
    ));

    suite
}

fn create_operator_tests() -> TestSuite {
    let mut suite = TestSuite::new("Operator Tests");

    suite.add_test(TestCase::should_fail("missing_left_operand", "+ 1"));
    suite.add_test(TestCase::should_fail("missing_both_operands", "*"));
    suite.add_test(TestCase::should_fail("double_plus", "1 ++ 2"));
    suite.add_test(TestCase::should_fail_with_message(
        "no_unary_minus",
        "1 - -2",
        "Unexpected token '-'",
    ));

    suite.add_test(TestCase::should_succeed("comparison_equal", "1 == 2"));
    suite.add_test(TestCase::should_succeed("comparison_not_equal", "1 != 2"));
    suite.add_test(TestCase::should_succeed("comparison_chain", "1 < 2 < 3"));
    suite.add_test(TestCase::should_succeed("logical_mix", "a && b || !c"));
    suite.add_test(TestCase::should_succeed("double_negation", "!!x"));
    suite.add_test(TestCase::should_succeed("negated_group", "!(x + 1)"));
    suite.add_test(TestCase::should_succeed("modulo", "7 % 3"));

    suite.add_test(TestCase::should_fail_with_message(
        "single_ampersand",
        "a & b",
        "Unrecognized character: '&'",
    ));

    suite
}

fn create_declaration_tests() -> TestSuite {
    let mut suite = TestSuite::new("Declaration Tests");

    suite.add_test(TestCase::should_succeed("let_with_value", "let x = 1"));
    suite.add_test(TestCase::should_succeed("let_without_value", "let x;"));
    suite.add_test(TestCase::should_succeed("const_with_value", "const x = 1"));

    suite.add_test(TestCase::should_fail_with_message(
        "const_without_value",
        "const x;",
        "Must assign value to a constant variable",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "let_without_semicolon_or_value",
        "let x",
        "Expected '=' after identifier in variable declaration",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "let_missing_identifier",
        "let = 5",
        "Expected identifier after 'let'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "let_keyword_as_name",
        "let if = 5",
        "Expected identifier after 'let'",
    ));

    suite
}

fn create_function_tests() -> TestSuite {
    let mut suite = TestSuite::new("Function Tests");

    suite.add_test(TestCase::should_succeed("simple_declaration", "fn add(x, y) { x + y }"));
    suite.add_test(TestCase::should_succeed("no_parameters", "fn one() { 1 }"));
    suite.add_test(TestCase::should_succeed(
        "nested_declaration",
        "fn outer(x) { fn inner(y) { x + y } inner }",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "empty_body",
        "fn nothing() {}",
        "Empty function body is not allowed",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "literal_parameter",
        "fn bad(1) { 1 }",
        "Function parameters must be identifiers",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_name",
        "fn (x) { x }",
        "Expected function name after 'fn'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_body",
        "fn f(x)",
        "Expected '{' before function body",
    ));

    suite
}

fn create_control_flow_tests() -> TestSuite {
    let mut suite = TestSuite::new("Control Flow Tests");

    suite.add_test(TestCase::should_succeed("valid_if", "if (true) { x = 1 }"));
    suite.add_test(TestCase::should_succeed(
        "full_if_chain",
        "if (a) { 1 } elseif (b) { 2 } elseif (c) { 3 } else { 4 }",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "if_missing_condition",
        "if { x = 1 }",
        "Expected '(' after 'if'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "if_empty_condition",
        "if () { x = 1 }",
        "Empty condition in 'if'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "if_missing_body",
        "if (true)",
        "Expected '{' before if body",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "if_empty_body",
        "if (true) {}",
        "Empty if body is not allowed",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "elseif_empty_condition",
        "if (a) { 1 } elseif () { 2 }",
        "Empty condition in 'elseif'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "else_empty_body",
        "if (a) { 1 } else {}",
        "Empty else body is not allowed",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "dangling_else",
        "else { 1 }",
        "Unexpected token 'else'",
    ));

    suite
}

fn create_literal_tests() -> TestSuite {
    let mut suite = TestSuite::new("Literal Tests");

    suite.add_test(TestCase::should_succeed("integer_literal", "42"));
    suite.add_test(TestCase::should_succeed("double_quoted_string", "\"hello\""));
    suite.add_test(TestCase::should_succeed("single_quoted_string", "'hello'"));
    suite.add_test(TestCase::should_succeed("empty_object", "{}"));
    suite.add_test(TestCase::should_succeed("nested_object", "{ one: 1, two: { three: 3 } }"));

    suite.add_test(TestCase::should_fail_with_message(
        "trailing_comma_in_object",
        "{ one: 1, }",
        "Expected property name in object literal",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_comma_in_object",
        "{ one: 1 two: 2 }",
        "Expected '}' after object properties",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_colon_in_object",
        "{ one 1 }",
        "Expected ':' after property name",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "string_key_in_object",
        "{ 'one': 1 }",
        "Expected property name in object literal",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "decimal_number",
        "3.14",
        "Expected property name after '.'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unterminated_string",
        "\"hello",
        "Unterminated string",
    ));

    suite
}

fn create_call_and_member_tests() -> TestSuite {
    let mut suite = TestSuite::new("Call And Member Tests");

    suite.add_test(TestCase::should_succeed("simple_function_call", "foo()"));
    suite.add_test(TestCase::should_succeed("function_call_with_args", "foo(1, 2, 3)"));
    suite.add_test(TestCase::should_succeed("curried_call", "f(1)(2)(3)"));
    suite.add_test(TestCase::should_succeed("member_chain", "a.b.c"));
    suite.add_test(TestCase::should_succeed("member_call", "a.b(1)"));

    suite.add_test(TestCase::should_fail_with_message(
        "missing_closing_paren",
        "foo(1, 2",
        "Expected ')' after arguments",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "trailing_comma",
        "foo(1, 2,)",
        "Unexpected token ')'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "numeric_member",
        "a.1",
        "Expected property name after '.'",
    ));

    suite
}

fn create_assignment_tests() -> TestSuite {
    let mut suite = TestSuite::new("Assignment Tests");

    suite.add_test(TestCase::should_succeed("simple_assignment", "x = 1"));
    suite.add_test(TestCase::should_succeed("chained_assignment", "x = y = 1"));
    suite.add_test(TestCase::should_succeed("object_assignment", "x = { a: 1 }"));
    // Assignee validity is checked when the assignment runs.
    suite.add_test(TestCase::should_succeed("literal_assignee", "1 = x"));

    suite.add_test(TestCase::should_fail_with_message(
        "missing_value",
        "x =",
        "Expected expression after '='",
    ));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_parser_tests() {
    println!("🧪 Tern Parser Robustness Test Suite");
    println!("====================================\n");

    let suites = vec![
        create_malformed_expressions_tests(),
        create_edge_case_tests(),
        create_operator_tests(),
        create_declaration_tests(),
        create_function_tests(),
        create_control_flow_tests(),
        create_literal_tests(),
        create_call_and_member_tests(),
        create_assignment_tests(),
    ];

    let mut failing_suites = Vec::new();
    for suite in suites {
        let results = suite.run();
        if !results.is_all_passed() {
            failing_suites.push(results.suite_name);
        }
    }

    assert!(
        failing_suites.is_empty(),
        "parser robustness failures in: {}",
        failing_suites.join(", ")
    );
}
