//! Board assembly: ordered words to ordered cells

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::backends::arasaac::PictogramSearch;
use crate::board::model::{Board, BoardItem, Draft};
use crate::pictos::resolver::Resolver;

/// Assemble a draft board for a patient.
///
/// One cell per input word, in input order, duplicates kept. A word that
/// cannot be resolved still gets a cell, with no pictogram.
pub fn assemble<S: PictogramSearch>(
    resolver: &Resolver<S>,
    patient: &str,
    phrase: Option<&str>,
    words: &[String],
) -> Draft {
    let items = resolve_all(resolver, words);
    Draft {
        patient: patient.to_string(),
        board: Board::new(phrase.map(str::to_string), items),
    }
}

#[cfg(feature = "parallel")]
fn resolve_all<S: PictogramSearch>(resolver: &Resolver<S>, words: &[String]) -> Vec<BoardItem> {
    // indexed collect keeps input order
    words.par_iter().map(|w| resolve_item(resolver, w)).collect()
}

#[cfg(not(feature = "parallel"))]
fn resolve_all<S: PictogramSearch>(resolver: &Resolver<S>, words: &[String]) -> Vec<BoardItem> {
    words.iter().map(|w| resolve_item(resolver, w)).collect()
}

fn resolve_item<S: PictogramSearch>(resolver: &Resolver<S>, word: &str) -> BoardItem {
    match resolver.resolve(word) {
        Ok(resolution) => BoardItem::resolved(word, resolution.picto, resolution.source),
        Err(e) => {
            tracing::warn!(word = %word, error = %e, "no pictogram for word");
            BoardItem::unresolved(word)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::model::PictoSource;
    use crate::pictos::resolver::tests::{resolver, FakeSearch};
    use crate::pictos::resolver::DEFAULT_UNIVERSAL_TERM;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quero_beber_agua() {
        let search = FakeSearch::new()
            .hit("pt", "quero", &["1"])
            .hit("pt", "tomar", &["2"])
            .hit("pt", "agua", &["3"])
            .hit("pt", DEFAULT_UNIVERSAL_TERM, &["999"]);
        let r = resolver(search);

        let draft = assemble(&r, "Maria", Some("quero beber água"), &words(&["quero", "beber", "água"]));
        assert_eq!(draft.patient, "Maria");
        assert_eq!(draft.board.phrase.as_deref(), Some("quero beber água"));

        let cells: Vec<_> = draft
            .board
            .items
            .iter()
            .map(|i| (i.word.as_str(), i.picto.as_ref().map(|p| p.id().to_string())))
            .collect();
        assert_eq!(
            cells,
            vec![
                ("quero", Some("1".to_string())),
                ("beber", Some("2".to_string())),
                ("água", Some("3".to_string())),
            ]
        );
        assert_eq!(draft.board.items[1].source, PictoSource::Alias);
    }

    #[test]
    fn test_order_and_duplicates_preserved_with_failures() {
        // service down: every word fails, but cells stay in order
        let r = resolver(FakeSearch::new().down());
        let input = words(&["eu", "quero", "eu", "bola"]);
        let draft = assemble(&r, "Ana", None, &input);

        let got: Vec<_> = draft.board.items.iter().map(|i| i.word.clone()).collect();
        assert_eq!(got, input);
        assert!(draft.board.items.iter().all(|i| i.picto.is_none()));
        assert!(draft
            .board
            .items
            .iter()
            .all(|i| i.source == PictoSource::Missing));
    }

    #[test]
    fn test_unknown_word_never_blank_when_service_up() {
        let r = resolver(FakeSearch::new().hit("pt", DEFAULT_UNIVERSAL_TERM, &["999"]));
        let draft = assemble(&r, "Ana", None, &words(&["xklqz"]));
        assert_eq!(draft.board.items[0].picto.as_ref().unwrap().id(), "999");
        assert_eq!(draft.board.items[0].source, PictoSource::Fallback);
    }

    #[test]
    fn test_empty_word_list() {
        let r = resolver(FakeSearch::new());
        let draft = assemble(&r, "Ana", None, &[]);
        assert!(draft.board.is_empty());
    }
}
