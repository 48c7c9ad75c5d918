extern crate luavalue;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use luavalue::{prelude::*, Closure, Prototype, Upvalue};
use std::{hint::black_box, sync::Arc};

/// Benchmark the three accessor tiers over numbers and numeral strings
///
/// Numeral strings go through the parser on every access, so the string
/// rows show the cost of string/number duality relative to native numbers.
fn bench_accessor_tiers(c: &mut Criterion) {
    let inputs = [
        ("int", Value::from(42)),
        ("float", Value::from(42.75)),
        ("numeral", Value::from("  0x2A  ")),
        ("fractional_numeral", Value::from("42.75e0")),
    ];

    let mut group = c.benchmark_group("accessor_tiers");
    for (name, value) in &inputs {
        group.bench_function(format!("to_long/{name}"), |b| {
            b.iter(|| black_box(black_box(value).to_long()));
        });
        group.bench_function(format!("opt_double/{name}"), |b| {
            b.iter(|| black_box(black_box(value).opt_double(0.0)));
        });
        group.bench_function(format!("check_text/{name}"), |b| {
            b.iter(|| black_box(black_box(value).check_text()));
        });
    }
    group.finish();
}

/// Benchmark positional argument access, including error construction for
/// a failing check
fn bench_positional_access(c: &mut Criterion) {
    let args = Varargs::of((0..16).map(Value::from));
    let bad = Varargs::of([Value::from(Table::new())]);

    let mut group = c.benchmark_group("varargs");
    group.throughput(Throughput::Elements(16));
    group.bench_function("check_int_all", |b| {
        b.iter(|| {
            let mut sum = 0;
            for i in 1..=16 {
                sum += black_box(&args).check_int(i).unwrap_or_default();
            }
            black_box(sum)
        });
    });
    group.bench_function("sub_args", |b| {
        b.iter(|| black_box(black_box(&args).sub_args(8)));
    });
    group.bench_function("check_int_failure", |b| {
        b.iter(|| black_box(black_box(&bad).check_int(1)));
    });
    group.finish();
}

#[derive(Debug)]
struct Loop;

impl Prototype for Loop {
    fn source(&self) -> &str {
        "bench.lua"
    }

    fn line_defined(&self) -> u32 {
        1
    }

    fn execute(&self, closure: &Closure, args: &Varargs) -> Result<Varargs> {
        let n = args.check_long(1)?;
        if n == 0 {
            return Ok(NONE);
        }
        let me = closure.upvalue(0).map(Upvalue::get).unwrap_or_default();
        Ok(Varargs::tailcall(me, Varargs::from(Value::from(n - 1))))
    }
}

/// Benchmark a chain of deferred tail calls resolved by the trampoline
fn bench_tail_calls(c: &mut Criterion) {
    let me = Upvalue::new(NIL);
    let function = Function::from(Closure::new(Arc::new(Loop), vec![me.clone()], None));
    me.set(Value::from(function.clone()));
    let function = Value::from(function);

    let mut group = c.benchmark_group("tail_calls");
    group.throughput(Throughput::Elements(1_000));
    group.bench_function("chain_1000", |b| {
        b.iter(|| black_box(function.call(&Varargs::from(Value::from(1_000)))));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_accessor_tiers,
    bench_positional_access,
    bench_tail_calls
);
criterion_main!(benches);
