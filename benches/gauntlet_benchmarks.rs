use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use histquiz::bank::Question;
use histquiz::session::gauntlet::build_gauntlet_set;
use histquiz::store::schema::WrongAnswers;

fn make_wrong_answers(genres: usize, per_genre: usize) -> WrongAnswers {
    let mut wrong = BTreeMap::new();
    for g in 0..genres {
        let questions = (0..per_genre)
            .map(|i| Question {
                id: (g * per_genre + i) as u32,
                text: format!("genre {g} question {i}"),
                choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_index: i % 4,
                explanation: String::new(),
            })
            .collect();
        wrong.insert(format!("genre{g}"), questions);
    }
    wrong
}

fn bench_build(c: &mut Criterion) {
    let wrong = make_wrong_answers(10, 50);
    let mut rng = SmallRng::seed_from_u64(42);

    c.bench_function("build_gauntlet_set (500 misses)", |b| {
        b.iter(|| build_gauntlet_set(black_box(&wrong), &mut rng))
    });
}

fn bench_build_large(c: &mut Criterion) {
    let wrong = make_wrong_answers(40, 250);
    let mut rng = SmallRng::seed_from_u64(42);

    c.bench_function("build_gauntlet_set (10k misses)", |b| {
        b.iter(|| build_gauntlet_set(black_box(&wrong), &mut rng))
    });
}

criterion_group!(benches, bench_build, bench_build_large);
criterion_main!(benches);
