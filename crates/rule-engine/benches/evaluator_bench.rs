//! 规则引擎性能基准测试
//!
//! 分别测量词法分析、解析、条件比较和整棵树评估的开销。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_engine::{
    Comparator, ConditionEvaluator, Record, RuleExecutor, Value, combine_rule_strings,
    evaluate_rule, parse_rule_to_ast, tokenize,
};
use std::hint::black_box;

const SIMPLE_RULE: &str = "age > 30";
const COMPOUND_RULE: &str = "(age > 30 OR age < 10) AND department = 'Sales'";

/// 生成由 n 个条件以 AND 串联的规则
fn chained_rule(n: usize) -> String {
    (0..n)
        .map(|i| format!("field_{} >= {}", i, i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn chained_record(n: usize) -> Record {
    (0..n)
        .map(|i| (format!("field_{}", i), Value::from(i as i64 + 1)))
        .collect()
}

/// 词法分析基准
fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    group.bench_function("simple", |b| b.iter(|| tokenize(black_box(SIMPLE_RULE))));
    group.bench_function("compound", |b| b.iter(|| tokenize(black_box(COMPOUND_RULE))));

    group.finish();
}

/// 解析基准（含词法分析）
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [1, 10, 50] {
        let rule = chained_rule(size);
        group.bench_with_input(BenchmarkId::new("chained_and", size), &rule, |b, rule| {
            b.iter(|| parse_rule_to_ast(black_box(rule)))
        });
    }

    group.bench_function("combine_two", |b| {
        b.iter(|| combine_rule_strings(black_box(&[SIMPLE_RULE, COMPOUND_RULE])))
    });

    group.finish();
}

/// 单条件比较基准
fn bench_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition");

    let number = Value::from(1000);
    let threshold = Value::from(500);
    let numeric_text = Value::from("1000");
    let text = Value::from("Sales");

    group.bench_function("number_gt_number", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(Some(&number)),
                black_box(&Comparator::Gt),
                black_box(&threshold),
            )
        })
    });

    group.bench_function("text_gt_number", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(Some(&numeric_text)),
                black_box(&Comparator::Gt),
                black_box(&threshold),
            )
        })
    });

    group.bench_function("text_eq_text", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(Some(&text)),
                black_box(&Comparator::Eq),
                black_box(&text),
            )
        })
    });

    group.bench_function("missing_field", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(None),
                black_box(&Comparator::Neq),
                black_box(&threshold),
            )
        })
    });

    group.finish();
}

/// 整棵树评估基准
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for size in [1, 10, 50] {
        let ast = parse_rule_to_ast(&chained_rule(size)).unwrap();
        let record = chained_record(size);
        group.bench_with_input(BenchmarkId::new("chained_and", size), &size, |b, _| {
            b.iter(|| evaluate_rule(black_box(Some(&ast)), black_box(&record)))
        });
    }

    let ast = parse_rule_to_ast(COMPOUND_RULE).unwrap();
    let record = Record::new().with("age", 5).with("department", "Sales");
    let executor = RuleExecutor::new().with_trace();
    group.bench_function("compound_with_trace", |b| {
        b.iter(|| executor.execute(black_box(Some(&ast)), black_box(&record)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_condition,
    bench_evaluate
);
criterion_main!(benches);
