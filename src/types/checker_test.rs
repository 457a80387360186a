use crate::error::ReportKind;
use crate::util::{check_string, must};

fn assert_pass(src: &str) {
    must(check_string(src));
}

fn assert_error(src: &str, msg: &str) {
    match check_string(src) {
        Ok(_) => panic!("expected error: '{}'", msg),
        Err(report) => {
            assert_eq!(report.kind, ReportKind::Semantic, "source: {}", src);
            assert_eq!(report.message, msg, "source: {}", src);
        }
    }
}

#[test]
fn test_arithmetic() {
    assert_pass("int a = 1 + 2;");
    assert_pass("int a = 1 mod 2;");
    assert_pass("dec d = 1 + 2.5;");
    assert_pass("dec d = 2.5 * 2;");
    assert_pass("dec d = 1;");

    assert_error(
        "int a = 1 + 2.5;",
        "incorrect initializer type: expected 'int', got 'dec'",
    );
    assert_error("1 + true;", "invalid operation: 'int' + 'bool'");
    assert_error("\"a\" - \"b\";", "invalid operation: 'string' - 'string'");
}

#[test]
fn test_string_concat_dominates() {
    assert_pass("string s = \"a\" + 1;");
    assert_pass("string s = 1 + \"a\";");
    assert_pass("string s = true + \"x\";");
    assert_pass("string s = \"x\" + 'c';");
    assert_pass("string s = \"a\" + \"b\";");
}

#[test]
fn test_equality_and_relational() {
    assert_pass("bool b = 'a' == 'a';");
    assert_pass("bool b = 1 < 2.0;");
    assert_pass("bool b = \"x\" != \"y\";");
    assert_pass("bool b = 1 == 1.5;");

    assert_error("'a' == 1;", "invalid operation: 'char' == 'int'");
    assert_error("\"a\" < \"b\";", "invalid operation: 'string' < 'string'");
}

#[test]
fn test_logical() {
    assert_pass("bool b = true and false;");
    assert_pass("bool b = true or false;");

    assert_error("true and 1;", "invalid operation: 'bool' and 'int'");
}

#[test]
fn test_ineligible_operands() {
    assert_error(
        "[1, 2] + 1;",
        "binary operator requires primitive operands, got 'list<int>'",
    );
    assert_error(
        "bool b = {1} == {1};",
        "binary operator requires primitive operands, got 'set<int>'",
    );
}

#[test]
fn test_unary() {
    assert_pass("bool b = !true;");
    assert_pass("int a = -1;");
    assert_pass("dec d = -1.5;");

    assert_error("!1;", "invalid operation: ! 'int'");
    assert_error("-true;", "invalid operation: - 'bool'");
}

#[test]
fn test_conditions() {
    assert_pass("if (true) { int a = 1; }");
    assert_pass("while (1 < 2) { }");

    assert_error("if (1) { }", "condition must be 'bool', got 'int'");
    assert_error("while (1) { }", "condition must be 'bool', got 'int'");
}

#[test]
fn test_undeclared() {
    assert_error("a = 1;", "not declared");
    assert_error("int b = a;", "not declared");
}

#[test]
fn test_variable_redeclaration() {
    assert_error("int a = 1; int a = 2;", "already declared");

    // Shadowing an outer frame is allowed
    assert_pass("int a = 1; { int a = 2; }");
    assert_pass("int a = 1; { bool a = true; { dec a = 1.5; } }");
}

#[test]
fn test_branch_scopes() {
    // Each branch body is checked in its own fresh scope
    assert_pass("if (true) { int a = 1; } else { int a = 2; }");
    assert_error("if (true) { int a = 1; } a;", "not declared");
}

#[test]
fn test_function_redeclaration() {
    assert_error(
        r#"
        func f() returns void {
        }

        func f() returns void {
        }
    "#,
        "already declared",
    );

    // Declaring in a nested inner scope shadows the outer one
    assert_pass(
        r#"
        func f() returns void {
        }

        {
            func f() returns int {
                return 1;
            }
        }
    "#,
    );
}

#[test]
fn test_separate_namespaces() {
    // A variable and a function may share a name in the same scope
    assert_pass(
        r#"
        int f = 1;

        func f() returns int {
            return 2;
        }

        int y = f + f();
    "#,
    );
}

#[test]
fn test_return_types() {
    assert_pass(
        r#"
        func foo() returns int {
            return 0;
        }

        func bar(int a, bool b) returns bool {
            return b;
        }
    "#,
    );

    assert_error(
        r#"
        func foo() returns int {
            return true;
        }
    "#,
        "incorrect return type: expected 'int', got 'bool'",
    );

    assert_error(
        r#"
        func foo() returns int {
            return;
        }
    "#,
        "incorrect return type: expected 'int', got none",
    );

    assert_error("return 1;", "'return' outside function");
}

#[test]
fn test_parameters_bound_in_body() {
    assert_pass(
        r#"
        func add(int a, int b) returns int {
            return a + b;
        }
    "#,
    );

    assert_error(
        r#"
        func foo(int a) returns int {
            return b;
        }
    "#,
        "not declared",
    );
}

#[test]
fn test_break_continue() {
    assert_pass("while (true) { break; }");
    assert_pass("while (true) { continue; }");

    assert_error("break;", "'break' outside loop");
    assert_error("continue;", "'continue' outside loop");

    // Loops do not cross function boundaries
    assert_error(
        r#"
        while (true) {
            func f() returns void {
                break;
            }
        }
    "#,
        "'break' outside loop",
    );
}

#[test]
fn test_call_checks() {
    assert_pass(
        r#"
        func add(int a, int b) returns int {
            return a + b;
        }

        int x = add(1, 2);
    "#,
    );

    assert_error(
        r#"
        func add(int a) returns int {
            return a;
        }

        int x = add(1, 2);
    "#,
        "expected 1 arguments, got 2",
    );

    assert_error(
        r#"
        func add(int a) returns int {
            return a;
        }

        int x = add(true);
    "#,
        "incorrect argument type: expected 'int', got 'bool'",
    );

    assert_error("int a = 1; a();", "not a function, got 'int'");
}

#[test]
fn test_lambda() {
    assert_pass("int x = func (int a) returns int { return a; }(3);");

    assert_error(
        "int x = func (int a) returns int { return true; }(3);",
        "incorrect return type: expected 'int', got 'bool'",
    );
}

#[test]
fn test_class_members() {
    assert_pass(
        r#"
        class Point {
            int x;

            func get() returns int {
                return this.x;
            }
        }

        Point p = new Point();
        int a = p.x;
        p.x = 2;
        int b = p.get();
    "#,
    );

    assert_error(
        r#"
        class Point {
            int x;
        }

        Point p = new Point();
        p.z;
    "#,
        "undefined member 'z'",
    );

    assert_error(
        r#"
        class Point {
            int x;
            dec x;
        }
    "#,
        "duplicate member",
    );
}

#[test]
fn test_class_redeclaration() {
    assert_error(
        r#"
        class A {
        }

        class A {
        }
    "#,
        "already declared",
    );
}

#[test]
fn test_forward_reference_placeholder() {
    // A class may reference itself before its declaration is processed
    assert_pass(
        r#"
        class Node {
            Node next;

            func tail() returns Node {
                return this.next;
            }
        }
    "#,
    );
}

#[test]
fn test_superclass() {
    assert_pass(
        r#"
        class A {
        }

        class B extends A {
            func parent() returns A {
                return super;
            }
        }
    "#,
    );

    assert_error("class B extends C { }", "not a type");

    assert_error(
        r#"
        class A {
            func f() returns A {
                return super;
            }
        }
    "#,
        "class has no superclass",
    );
}

#[test]
fn test_no_inherited_member_lookup() {
    // Member lookup reads the direct declaration maps only
    assert_error(
        r#"
        class A {
            int x;
        }

        class B extends A {
        }

        B b = new B();
        int v = b.x;
    "#,
        "undefined member 'x'",
    );
}

#[test]
fn test_this_outside_class() {
    assert_error("this;", "'this' is only allowed inside a class");
    assert_error("super;", "'super' is only allowed inside a class");
}

#[test]
fn test_lists_and_sets() {
    assert_pass("list<int> xs = [1, 2, 3];");
    assert_pass("set<string> tags = {\"a\", \"b\"};");
    assert_pass("list<int> xs = [];");
    assert_pass("set<string> tags = {};");
    assert_pass("list<int> xs = [1, 2]; int x = xs[0];");

    assert_error("[];", "cannot infer element type of empty list");
    assert_error(
        "[1, \"a\"];",
        "mismatched element type: expected 'int', got 'string'",
    );
    assert_error(
        "list<int> xs = [1]; xs[true];",
        "incorrect index type: expected 'int', got 'bool'",
    );
    assert_error("1[0];", "only lists can be indexed, got 'int'");
    assert_error(
        "set<int> s = {1}; s[0];",
        "only lists can be indexed, got 'set<int>'",
    );
}

#[test]
fn test_graph_operations() {
    assert_pass(
        r#"
        g {
            V+ {"server"} 3;
            V- ["legacy"];
            ["server"] => ["db"] 5;
            ["a"] <=> ["b"];
            ["a"] =/= ["b"];
            ["server"] ++ {"active"};
            ["server"] -- {"stale"};
            "old" << "new";
            "gone" << null;
        };
    "#,
    );
}

#[test]
fn test_graph_tag_set_type() {
    assert_error(
        "g { V+ {1}; };",
        "incorrect tag set type: expected 'set<string>', got 'set<int>'",
    );
    assert_error(
        "g { [\"a\"] ++ [1]; };",
        "incorrect tag set type: expected 'set<string>', got 'list<int>'",
    );

    // An empty tag set takes its type from the expectation
    assert_pass("g { V+ {}; };");
}

#[test]
fn test_graph_predicates() {
    assert_pass("g { V- [\"a\" and !\"b\" or (\"c\")]; };");
    assert_pass("g { int n = 2; V- [n]; };");

    assert_error(
        "g { V- [[1, 2]]; };",
        "predicate must be a primitive value, got 'list<int>'",
    );
}

#[test]
fn test_graph_control_flow() {
    assert_pass(
        r#"
        g {
            int i = 0;
            while (i < 3) {
                V+ {"n"};
                i = i + 1;
            }
            if (i == 3) {
                V- ["n"];
            } else {
                "n" << null;
            }
        };
    "#,
    );

    assert_error(
        "g { while (1) { V+ {\"a\"}; } };",
        "condition must be 'bool', got 'int'",
    );
}

#[test]
fn test_graph_scope_closes() {
    assert_error("g { int i = 0; }; int j = i;", "not declared");
}

#[test]
fn test_end_to_end() {
    assert_pass("int a = 1 + 2;");
    assert_pass("g { [\"x\"] => [\"y\"] 5; };");
}
