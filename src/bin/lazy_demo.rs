use clap::Parser;
use lazy_scope::cmdline::{self, Options};
use lazy_scope::{Expression, Failure, Interpreter, LambdaBody, Scope};

fn int(expr: &Expression) -> Option<i64> {
    expr.as_value().and_then(|v| v.downcast_ref::<i64>()).copied()
}

fn natives() -> Vec<(&'static str, Expression)> {
    let add = Expression::native("add", |args, _| {
        match args.iter().map(int).collect::<Option<Vec<_>>>() {
            Some(ints) => Expression::value(ints.iter().sum::<i64>()),
            None => Failure::native("add expects integers").into(),
        }
    });
    let first = Expression::native("first", |args, _| match args.get(0) {
        Some(arg) => arg.clone(),
        None => Failure::native("first needs an argument").into(),
    });
    vec![("add", add), ("first", first)]
}

fn lambda(body: Expression) -> Expression {
    Expression::lambda(LambdaBody::bare(body))
}

fn call(operator: &str, arguments: Vec<Expression>) -> Expression {
    Expression::apply(Expression::id(operator), arguments)
}

fn programs() -> Vec<(&'static str, Expression)> {
    let num = |n: i64| Expression::value(n);
    vec![
        ("constant", num(42)),
        ("native call", call("first", vec![num(1), num(2)])),
        (
            "bindings",
            Expression::lambda(
                LambdaBody::builder()
                    .bind("x", num(1))
                    .bind("y", call("x", vec![]))
                    .returning(Expression::id("y")),
            ),
        ),
        (
            "closure",
            Expression::lambda(
                LambdaBody::builder()
                    .bind(
                        "double",
                        lambda(call("add", vec![Expression::id("$0"), Expression::id("$0")])),
                    )
                    .returning(call("double", vec![num(21)])),
            ),
        ),
        (
            "higher order",
            Expression::lambda(
                LambdaBody::builder()
                    .bind(
                        "twice",
                        lambda(call("$0", vec![call("$0", vec![Expression::id("$1")])])),
                    )
                    .bind("inc", lambda(call("add", vec![Expression::id("$0"), num(1)])))
                    .returning(call("twice", vec![Expression::id("inc"), num(5)])),
            ),
        ),
        (
            "lexical scope",
            Expression::lambda(
                LambdaBody::builder()
                    .bind("x", Expression::value(String::from("definition")))
                    .bind("show", lambda(Expression::id("x")))
                    .bind(
                        "caller",
                        Expression::lambda(
                            LambdaBody::builder()
                                .bind("x", Expression::value(String::from("caller")))
                                .returning(call("show", vec![])),
                        ),
                    )
                    .returning(call("caller", vec![])),
            ),
        ),
        (
            "missing argument",
            Expression::lambda(
                LambdaBody::builder()
                    .bind("second", lambda(Expression::id("$1")))
                    .returning(call("second", vec![num(1)])),
            ),
        ),
        ("missing identifier", Expression::id("nowhere")),
        (
            "runaway",
            Expression::lambda(
                LambdaBody::builder()
                    .bind("spin", lambda(call("spin", vec![])))
                    .returning(call("spin", vec![])),
            ),
        ),
    ]
}

fn main() {
    pretty_env_logger::init();
    let options = Options::parse();

    let mut interpreter = Interpreter::with_limits(options.limits());
    let root = Scope::root_with(natives());
    for (name, program) in programs() {
        let outcome = interpreter.interpret_in(&program, &root);
        println!("{}", cmdline::report(name, &program, &outcome, options.color()));
    }
}
