use criterion::{black_box, criterion_group, criterion_main, Criterion};

use exampro_core::answers::{AnswerSnapshot, AnswerStore};
use exampro_core::model::{AnswerValue, MatchingPair, Question, QuestionBody, Verdict};
use exampro_core::scoring::{grade, score};

fn mixed_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            let id = format!("q{i}");
            let body = match i % 4 {
                0 => QuestionBody::SingleChoice {
                    options: vec!["A".into(), "B".into(), "C".into()],
                    correct_answer: "B".into(),
                },
                1 => QuestionBody::ComplexChoice {
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    correct_answer: vec!["A".into(), "C".into()],
                },
                2 => QuestionBody::TrueFalse {
                    correct_answer: Verdict::True,
                },
                _ => QuestionBody::Matching {
                    matching_pairs: (0..4)
                        .map(|p| MatchingPair {
                            id: format!("p{p}"),
                            left: format!("L{p}"),
                            right: format!("R{p}"),
                        })
                        .collect(),
                },
            };
            Question::new(id, "prompt", 1.0, body)
        })
        .collect()
}

fn answers_for(questions: &[Question]) -> AnswerSnapshot {
    let mut store = AnswerStore::new();
    for (i, q) in questions.iter().enumerate() {
        let value = match i % 4 {
            0 => AnswerValue::text("B"),
            1 => AnswerValue::selection(["C", "A"]),
            2 => AnswerValue::text("TRUE"),
            _ => AnswerValue::pairs((0..4).map(|p| (format!("L{p}"), format!("R{p}")))),
        };
        store.set(q.id.clone(), value);
    }
    store.snapshot()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [10, 100, 500] {
        let questions = mixed_questions(n);
        let answers = answers_for(&questions);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_grade(c: &mut Criterion) {
    let questions = mixed_questions(500);
    let answers = answers_for(&questions);
    let empty = AnswerSnapshot::default();

    let mut group = c.benchmark_group("grade");
    group.bench_function("answered", |b| {
        b.iter(|| grade(black_box(&questions), black_box(&answers)))
    });
    group.bench_function("unanswered", |b| {
        b.iter(|| grade(black_box(&questions), black_box(&empty)))
    });
    group.finish();
}

criterion_group!(benches, bench_score, bench_grade);
criterion_main!(benches);
