// Programs bundled with the driver. There is no parser, so they are built
// straight from the AST builders.

use frontend::ast::Expr;
use frontend::builder::*;

pub struct Demo {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn() -> Expr,
}

pub fn all() -> Vec<Demo> {
    vec![
        Demo {
            name: "countdown",
            description: "prints 3, 2, 1 with a while loop",
            build: countdown,
        },
        Demo {
            name: "factorial",
            description: "computes 10! and prints every partial product",
            build: factorial,
        },
        Demo {
            name: "fizzbuzz",
            description: "fizzbuzz up to 15, modulo done with floor division",
            build: fizzbuzz,
        },
        Demo {
            name: "greeting",
            description: "string concatenation and comparison",
            build: greeting,
        },
        Demo {
            name: "branches",
            description: "shows that both branches of an if are evaluated",
            build: branches,
        },
        Demo {
            name: "type-error",
            description: "reassigning a variable with another type aborts the run",
            build: type_error,
        },
        Demo {
            name: "unassigned",
            description: "reading a variable before assigning it aborts the run",
            build: unassigned,
        },
    ]
}

pub fn find(name: &str) -> Option<Demo> {
    all().into_iter().find(|d| d.name == name)
}

fn countdown() -> Expr {
    program(vec![
        assign("i", int(3)),
        while_loop(
            gt(var("i"), int(0)),
            seq(vec![
                print(var("i")),
                assign("i", sub(var("i"), int(1))),
            ]),
        ),
    ])
}

fn factorial() -> Expr {
    program(vec![
        assign("n", int(10)),
        assign("acc", int(1)),
        while_loop(
            gt(var("n"), int(1)),
            seq(vec![
                assign("acc", mul(var("acc"), var("n"))),
                print(var("acc")),
                assign("n", sub(var("n"), int(1))),
            ]),
        ),
        var("acc"),
    ])
}

// a - (a / b) * b
fn modulo(a: Expr, b: Expr) -> Expr {
    sub(a.clone(), mul(div(a, b.clone()), b))
}

fn fizzbuzz() -> Expr {
    // Both branches of an if run, so the text is picked by the if and
    // printed once afterwards
    let label = if_else(
        eq(modulo(var("i"), int(15)), int(0)),
        string("FizzBuzz"),
        if_else(
            eq(modulo(var("i"), int(3)), int(0)),
            string("Fizz"),
            if_else(
                eq(modulo(var("i"), int(5)), int(0)),
                string("Buzz"),
                string(""),
            ),
        ),
    );

    program(vec![
        assign("i", int(1)),
        while_loop(
            lte(var("i"), int(15)),
            seq(vec![
                assign("label", label),
                print(if_else(eq(var("label"), string("")), var("i"), int(0))),
                print(var("label")),
                assign("i", add(var("i"), int(1))),
            ]),
        ),
    ])
}

fn greeting() -> Expr {
    program(vec![
        assign("name", string("world")),
        assign("greeting", add(string("hello, "), var("name"))),
        print(var("greeting")),
        print(lt(var("name"), string("zebra"))),
        print(ren()),
        var("greeting"),
    ])
}

fn branches() -> Expr {
    program(vec![
        assign("taken", int(0)),
        if_else(
            boolean(true),
            seq(vec![print(string("true branch")), assign("taken", add(var("taken"), int(1)))]),
            seq(vec![print(string("false branch")), assign("taken", add(var("taken"), int(1)))]),
        ),
        var("taken"),
    ])
}

fn type_error() -> Expr {
    program(vec![
        assign("x", int(1)),
        print(var("x")),
        assign("x", float(1.5)),
        print(string("unreachable")),
    ])
}

fn unassigned() -> Expr {
    program(vec![
        print(string("reading y")),
        print(var("y")),
    ])
}
