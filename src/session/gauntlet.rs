use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::Question;
use crate::store::schema::WrongAnswers;

/// Concatenates every genre's misses in map order, then shuffles the whole set.
pub fn build_gauntlet_set<R: Rng + ?Sized>(wrong: &WrongAnswers, rng: &mut R) -> Vec<Question> {
    let mut questions: Vec<Question> = wrong.values().flatten().cloned().collect();
    questions.shuffle(rng);
    questions
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn q(text: &str) -> Question {
        Question {
            id: 0,
            text: text.to_string(),
            choices: vec!["a".into(), "b".into()],
            correct_index: 0,
            explanation: String::new(),
        }
    }

    fn sorted_texts(questions: &[Question]) -> Vec<String> {
        let mut texts: Vec<String> = questions.iter().map(|q| q.text.clone()).collect();
        texts.sort();
        texts
    }

    #[test]
    fn empty_ledger_gives_empty_set() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(build_gauntlet_set(&WrongAnswers::new(), &mut rng).is_empty());
    }

    #[test]
    fn set_contains_every_miss_exactly_once() {
        let mut wrong = WrongAnswers::new();
        wrong.insert("meiji".into(), vec![q("a"), q("b")]);
        wrong.insert("showa".into(), vec![q("c")]);

        let mut rng = SmallRng::seed_from_u64(7);
        let set = build_gauntlet_set(&wrong, &mut rng);
        assert_eq!(set.len(), 3);
        assert_eq!(sorted_texts(&set), vec!["a", "b", "c"]);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let mut wrong = WrongAnswers::new();
        wrong.insert("g".into(), (0..20).map(|i| q(&i.to_string())).collect());

        let a = build_gauntlet_set(&wrong, &mut SmallRng::seed_from_u64(42));
        let b = build_gauntlet_set(&wrong, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_moves_things_around() {
        let mut wrong = WrongAnswers::new();
        wrong.insert("g".into(), (0..20).map(|i| q(&i.to_string())).collect());
        let original: Vec<Question> = wrong["g"].clone();

        // 20! orderings; a few seeds landing on identity would be astronomically unlikely.
        let moved = (0..5u64)
            .map(|seed| build_gauntlet_set(&wrong, &mut SmallRng::seed_from_u64(seed)))
            .any(|set| set != original);
        assert!(moved);
    }
}
