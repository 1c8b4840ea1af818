use crate::scholar::{
    PaperRecord,
    html::{Token, Tokenizer},
};

/// Class on the anchor holding a paper title.
pub const TITLE_CLASS: &str = "gsc_a_at";
/// Class on the anchor holding a paper's citation count.
pub const CITATION_CLASS: &str = "gsc_a_ac";

/// Which anchors we are currently collecting text for. A title anchor and a citation anchor can
/// be open at the same time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Capture {
    #[default]
    Idle,
    Title,
    Citation,
    TitleAndCitation,
}

impl Capture {
    fn open_title(self) -> Self {
        match self {
            Capture::Idle | Capture::Title => Capture::Title,
            Capture::Citation | Capture::TitleAndCitation => Capture::TitleAndCitation,
        }
    }

    fn open_citation(self) -> Self {
        match self {
            Capture::Idle | Capture::Citation => Capture::Citation,
            Capture::Title | Capture::TitleAndCitation => Capture::TitleAndCitation,
        }
    }

    fn in_title(self) -> bool {
        matches!(self, Capture::Title | Capture::TitleAndCitation)
    }

    fn in_citation(self) -> bool {
        matches!(self, Capture::Citation | Capture::TitleAndCitation)
    }
}

/// Pairs title anchors with the citation anchor that follows them, in document order.
#[derive(Debug, Default)]
pub struct Extractor {
    state: Capture,
    title: String,
    citations: String,
    papers: Vec<PaperRecord>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, token: &Token<'_>) {
        match token {
            Token::Start { name, .. } if name == "a" => {
                let class = token.attr("class").unwrap_or_default();
                if class.contains(TITLE_CLASS) {
                    self.state = self.state.open_title();
                    self.title.clear();
                }
                if class.contains(CITATION_CLASS) {
                    self.state = self.state.open_citation();
                    self.citations.clear();
                }
            }
            Token::End { name } if name == "a" => {
                // One closing anchor ends both captures.
                let finished_row = self.state.in_citation();
                self.state = Capture::Idle;
                if finished_row {
                    self.papers.push(PaperRecord {
                        title: self.title.trim().to_string(),
                        citations: parse_citations(&self.citations),
                    });
                }
            }
            Token::Text(text) => {
                if self.state.in_title() {
                    self.title.push_str(text);
                }
                if self.state.in_citation() {
                    self.citations.push_str(text);
                }
            }
            _ => {}
        }
    }

    pub fn finish(self) -> Vec<PaperRecord> {
        self.papers
    }
}

/// Citation cells are either a plain number or something else (empty, an asterisk, ...) which
/// counts as zero.
fn parse_citations(raw: &str) -> u64 {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Pull every (title, citations) row out of a profile page.
pub fn extract_papers(html: &str) -> Vec<PaperRecord> {
    let mut extractor = Extractor::new();
    for token in Tokenizer::new(html) {
        extractor.feed(&token);
    }
    extractor.finish()
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    fn anchor(class: &str) -> Token<'static> {
        Token::Start {
            name: "a".to_string(),
            attrs: vec![("class".to_string(), class.to_string())],
        }
    }

    fn close() -> Token<'static> {
        Token::End {
            name: "a".to_string(),
        }
    }

    fn text(s: &str) -> Token<'_> {
        Token::Text(Cow::Borrowed(s))
    }

    fn paper(title: &str, citations: u64) -> PaperRecord {
        PaperRecord {
            title: title.to_string(),
            citations,
        }
    }

    #[test]
    fn pairs_token_stream_in_document_order() {
        let stream = [
            anchor("gsc_a_at"),
            text("First Paper"),
            close(),
            anchor("gsc_a_ac gs_ibl"),
            text("123"),
            close(),
            anchor("gsc_a_at"),
            text("Second Paper"),
            close(),
            anchor("gsc_a_ac gs_ibl"),
            text("n/a"),
            close(),
        ];
        let mut extractor = Extractor::new();
        for token in &stream {
            extractor.feed(token);
        }
        assert_eq!(
            extractor.finish(),
            vec![paper("First Paper", 123), paper("Second Paper", 0)]
        );
    }

    #[test]
    fn extracts_rows_from_profile_markup() {
        let html = r##"
<table id="gsc_a_t"><tbody id="gsc_a_b">
<tr class="gsc_a_tr">
  <td class="gsc_a_t"><a href="/citations?view_op=view_citation&amp;hl=en" class="gsc_a_at">Attention &amp; Memory:
    A Survey</a><div class="gs_gray">A Author, B Author</div></td>
  <td class="gsc_a_c"><a href="https://scholar.google.com/scholar?cites=1" class="gsc_a_ac gs_ibl">  1520 </a></td>
  <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">2021</span></td>
</tr>
<tr class="gsc_a_tr">
  <td class="gsc_a_t"><a href="#" class="gsc_a_at">Unpublished Notes</a></td>
  <td class="gsc_a_c"><a href="javascript:void(0)" class="gsc_a_ac gs_ibl gsc_a_acm"></a></td>
</tr>
</tbody></table>"##;
        assert_eq!(
            extract_papers(html),
            vec![
                paper("Attention & Memory:\n    A Survey", 1520),
                paper("Unpublished Notes", 0),
            ]
        );
    }

    #[test]
    fn nested_markup_inside_title_is_kept_as_text() {
        let html = r#"<a class="gsc_a_at">Deep <b>Learning</b></a><a class="gsc_a_ac">7</a>"#;
        assert_eq!(extract_papers(html), vec![paper("Deep Learning", 7)]);
    }

    #[test]
    fn citation_pairs_with_most_recent_title() {
        let html = concat!(
            r#"<a class="gsc_a_at">Old</a>"#,
            r#"<a class="gsc_a_at">New</a>"#,
            r#"<a class="gsc_a_ac">9</a>"#,
        );
        assert_eq!(extract_papers(html), vec![paper("New", 9)]);
    }

    #[test]
    fn title_without_citation_anchor_is_dropped() {
        let html = r#"<a class="gsc_a_at">Lonely</a><a class="other">12</a>"#;
        assert!(extract_papers(html).is_empty());
    }

    #[test]
    fn overlapping_captures_accumulate_independently() {
        // An anchor carrying both classes feeds both buffers and closes in one go.
        let html = r#"<a class="gsc_a_at gsc_a_ac">42</a>"#;
        assert_eq!(extract_papers(html), vec![paper("42", 42)]);
    }

    #[test]
    fn self_closing_citation_anchor_ends_its_row() {
        let html = concat!(
            r#"<a class="gsc_a_at">A</a><a class="gsc_a_ac"/>"#,
            r#"<a class="gsc_a_at">B</a><a class="gsc_a_ac">60</a>"#,
        );
        assert_eq!(extract_papers(html), vec![paper("A", 0), paper("B", 60)]);
    }

    #[test]
    fn unresolvable_ampersand_does_not_block_other_entities() {
        let html = r#"<a class="gsc_a_at">Fish &amp; R&D</a><a class="gsc_a_ac">5</a>"#;
        let papers = extract_papers(html);
        assert_eq!(papers, vec![paper("Fish & R&D", 5)]);
        assert_eq!(crate::normalize::normalize(&papers[0].title), "fishrd");
    }

    #[test]
    fn citation_text_must_be_all_digits() {
        assert_eq!(parse_citations("123"), 123);
        assert_eq!(parse_citations(" 45\n"), 45);
        assert_eq!(parse_citations("n/a"), 0);
        assert_eq!(parse_citations("1,204"), 0);
        assert_eq!(parse_citations("*"), 0);
        assert_eq!(parse_citations(""), 0);
    }
}
