use goimpl_parser::lexer::{Lexer, Tok};
use goimpl_parser::parse_source;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]
    #[test]
    fn lexer_never_panics_and_progresses(s in ".*") {
        let lx = Lexer::new(&s);

        // furthest end offset seen so far
        let mut max_end = 0usize;
        // end of the last token that came from the input (not an inserted `;`)
        let mut last_real_end = 0usize;

        let max_steps = s.len().saturating_mul(4) + 64;

        for (steps, (start, tok, end)) in lx.enumerate() {
            prop_assert!(start <= end, "start>end: ({start},{end}) tok={tok:?} input={s:?}");
            prop_assert!(end <= s.len(), "end out of bounds: ({start},{end}) tok={tok:?} input={s:?}");

            let injected_semi = matches!(tok, Tok::Semi) && start == end;
            if injected_semi {
                prop_assert!(
                    start >= max_end,
                    "inserted `;` before progress: pos={start} < max_end={max_end} input={s:?}"
                );
            } else {
                prop_assert!(
                    start >= last_real_end,
                    "token moved backwards: start={start} < {last_real_end} tok={tok:?} input={s:?}"
                );
                last_real_end = end;
            }
            max_end = max_end.max(end);

            prop_assert!(steps <= max_steps, "possible hang: steps={steps} input={s:?}");
        }
    }

    #[test]
    fn parser_never_panics(body in "[a-zA-Z0-9_ (){}\\[\\]*.,;:=<\\-~|\n\t\"`]*") {
        let src = format!("package p\n{body}");
        let _ = parse_source(&src);
    }

    #[test]
    fn method_sets_of_generated_interfaces_parse(
        names in proptest::collection::vec("[A-Z][a-zA-Z0-9]{0,8}", 1..8)
    ) {
        let mut src = String::from("package p\n\ntype I interface {\n");
        for n in &names {
            src.push_str(&format!("\t{n}(ctx Context, args ...string) (int, error)\n"));
        }
        src.push_str("}\n");
        let file = parse_source(&src);
        prop_assert!(file.is_ok(), "{src}\n{:?}", file.err());
    }
}
