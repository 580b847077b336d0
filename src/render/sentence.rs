//! Sentence segmentation.
//!
//! Running text is written one sentence per line ("semantic newlines",
//! man-pages(7)), so a sentence break never lands mid-line where roff
//! would add inter-sentence spacing inconsistently.

use regex::Regex;
use std::sync::OnceLock;

/// Abbreviations after which a terminator does not end a sentence.
/// Matched case-sensitively against the end of a segment.
const SUPPRESSIONS: &[&str] = &[
    "L.P.", "Alt.", "Approx.", "E.G.", "O.", "Maj.", "Misc.", "P.O.", "J.D.", "Jam.", "Card.",
    "Dec.", "Sept.", "MR.", "Long.", "Hat.", "G.", "Link.", "DC.", "D.C.", "M.T.", "Hz.", "Mrs.",
    "By.", "Act.", "Var.", "N.V.", "Aug.", "B.", "S.A.", "Up.", "Job.", "Num.", "M.I.T.", "Ok.",
    "Org.", "Ex.", "Cont.", "U.", "Mart.", "Fn.", "Abs.", "Lt.", "OK.", "Z.", "E.", "Kb.", "Est.",
    "A.M.", "L.A.", "Prof.", "U.S.", "Nov.", "Ph.D.", "Mar.", "I.T.", "exec.", "Jan.", "N.Y.", "X.",
    "Md.", "Op.", "vs.", "D.A.", "A.D.", "R.L.", "P.M.", "Or.", "M.R.", "Cap.", "PC.", "Feb.",
    "Exec.", "I.e.", "Sep.", "Gb.", "K.", "U.S.C.", "Mt.", "S.", "A.S.", "C.O.D.", "Capt.", "Col.",
    "In.", "C.F.", "Adj.", "AD.", "I.D.", "Mgr.", "R.T.", "B.V.", "M.", "Conn.", "Yr.", "Rev.",
    "Phys.", "pp.", "Ms.", "To.", "Sgt.", "J.K.", "Nr.", "Jun.", "Fri.", "S.A.R.", "Lev.",
    "Lt.Cdr.", "Def.", "F.", "Do.", "Joe.", "Id.", "Mr.", "Dept.", "Is.", "Pvt.", "Diff.",
    "Hon.B.A.", "Q.", "Mb.", "On.", "Min.", "J.B.", "Ed.", "AB.", "A.", "S.p.A.", "I.", "a.m.",
    "Comm.", "Go.", "VS.", "L.", "All.", "PP.", "P.V.", "T.", "K.R.", "Etc.", "D.", "Adv.", "Lib.",
    "E.g.", "Pro.", "U.S.A.", "S.E.", "AA.", "Rep.", "Sq.", "As.", "LLC.", "LTD.", "i.e.", "e.g",
];

fn terminator() -> &'static Regex {
    static TERMINATOR: OnceLock<Regex> = OnceLock::new();
    TERMINATOR.get_or_init(|| Regex::new(r#"[.!?]+['"]*\s+"#).expect("valid terminator pattern"))
}

fn suppressed(segment: &str) -> bool {
    let segment = segment.trim_end();
    SUPPRESSIONS.iter().any(|abbr| segment.ends_with(abbr))
}

/// Split text into trimmed sentences.
pub fn segment(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for found in terminator().find_iter(text) {
        pieces.push(&text[start..found.end()]);
        start = found.end();
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    let mut sentences = Vec::new();
    let mut prefix = String::new();
    for piece in pieces {
        if suppressed(piece) {
            prefix.push_str(piece);
            continue;
        }
        prefix.push_str(piece);
        sentences.push(std::mem::take(&mut prefix));
    }
    if !prefix.is_empty() {
        sentences.push(prefix);
    }

    sentences
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect()
}
