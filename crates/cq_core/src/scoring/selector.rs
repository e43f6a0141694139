use crate::models::{Code, ScoreTable};

/// All non-excluded codes tied for the highest score, in hexagon order.
///
/// The exclusion list carries the codes already ranked, so each call
/// answers "who contends for the next rank". Returns an empty vector only
/// when every code is excluded, which callers treat as a state error.
pub fn leaders(table: &ScoreTable, exclude: &[Code]) -> Vec<Code> {
    let max = Code::ALL
        .iter()
        .filter(|code| !exclude.contains(code))
        .map(|&code| table.get(code))
        .max();

    match max {
        Some(max) => Code::ALL
            .iter()
            .copied()
            .filter(|code| !exclude.contains(code) && table.get(*code) == max)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: [(Code, u32); 6]) -> ScoreTable {
        values.into_iter().collect()
    }

    fn demo_table() -> ScoreTable {
        table([
            (Code::Realistic, 3),
            (Code::Investigative, 3),
            (Code::Artistic, 1),
            (Code::Social, 1),
            (Code::Enterprising, 1),
            (Code::Conventional, 1),
        ])
    }

    #[test]
    fn test_unique_leader() {
        let mut scores = demo_table();
        scores.set(Code::Investigative, 5);
        assert_eq!(leaders(&scores, &[]), vec![Code::Investigative]);
    }

    #[test]
    fn test_tied_leaders_in_hexagon_order() {
        assert_eq!(
            leaders(&demo_table(), &[]),
            vec![Code::Realistic, Code::Investigative]
        );
    }

    #[test]
    fn test_exclusions_shift_the_field() {
        let scores = demo_table();
        assert_eq!(
            leaders(&scores, &[Code::Investigative, Code::Realistic]),
            vec![
                Code::Artistic,
                Code::Social,
                Code::Enterprising,
                Code::Conventional
            ]
        );
    }

    #[test]
    fn test_all_excluded_yields_empty() {
        assert_eq!(leaders(&demo_table(), &Code::ALL), vec![]);
    }

    #[test]
    fn test_zero_table_ties_all_six() {
        assert_eq!(leaders(&ScoreTable::new(), &[]), Code::ALL.to_vec());
    }
}
