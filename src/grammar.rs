//! L-system string rewriting

/// Rewrite `axiom` through `rules` for `iterations` generations.
///
/// Every symbol is replaced in parallel each generation; symbols with no rule
/// are copied through. The first rule for a symbol wins.
pub fn expand(axiom: &str, rules: &[(char, &str)], iterations: u32) -> String {
    let mut current = axiom.to_string();

    for _ in 0..iterations {
        if rules.is_empty() {
            break;
        }

        let mut next = String::with_capacity(current.len() * 4);
        for ch in current.chars() {
            match rules.iter().find(|(symbol, _)| *symbol == ch) {
                Some((_, replacement)) => next.push_str(replacement),
                None => next.push(ch),
            }
        }
        current = next;
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOWER: &[(char, &str)] = &[('F', "FF[+F][-F]")];

    #[test]
    fn zero_iterations_returns_axiom() {
        assert_eq!(expand("F", FLOWER, 0), "F");
        assert_eq!(expand("F+F", &[('F', "G")], 0), "F+F");
    }

    #[test]
    fn one_generation_of_flower() {
        assert_eq!(expand("F", FLOWER, 1), "FF[+F][-F]");
    }

    #[test]
    fn rewriting_is_parallel_not_sequential() {
        // A -> B and B -> A swap in one step rather than collapsing
        let rules = [('A', "B"), ('B', "A")];
        assert_eq!(expand("AB", &rules, 1), "BA");
        assert_eq!(expand("AB", &rules, 2), "AB");
    }

    #[test]
    fn unmapped_symbols_pass_through() {
        assert_eq!(expand("F[+X]", FLOWER, 1), "FF[+F][-F][+X]");
    }

    #[test]
    fn empty_rules_are_identity() {
        assert_eq!(expand("F[+F]", &[], 5), "F[+F]");
    }

    #[test]
    fn deterministic_and_growing() {
        let mut prev_len = 0;
        for n in 0..5 {
            let a = expand("F", FLOWER, n);
            let b = expand("F", FLOWER, n);
            assert_eq!(a, b);
            assert!(a.len() > prev_len);
            prev_len = a.len();
        }
    }

    #[test]
    fn draw_count_multiplies_per_generation() {
        let s = expand("F", FLOWER, 3);
        assert_eq!(s.chars().filter(|&c| c == 'F').count(), 64);
        assert_eq!(s.matches('[').count(), s.matches(']').count());
    }
}
