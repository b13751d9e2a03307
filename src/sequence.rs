use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::str::FromStr;

/// Identifier of a single page. Only equality is meaningful to the replacement policies.
pub type PageId = u32;

const RANDOM_MIN_LENGTH: usize = 10;
const RANDOM_MAX_LENGTH: usize = 20;
const RANDOM_MAX_PAGE: PageId = 8;
const LOCALITY_WARMUP: usize = 3;
const LOCALITY_WINDOW: usize = 3;
const LOCALITY_PROBABILITY: f64 = 0.7;

/// `ReferenceSequence` is the ordered, non-empty list of page requests that drives a simulation.
/// It is never mutated once a run begins; policies only ever read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceSequence(Vec<PageId>);

impl ReferenceSequence {
    /// Wrap the provided pages in a new `ReferenceSequence`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSequence` when `pages` is empty.
    pub fn build(pages: Vec<PageId>) -> Result<Self> {
        if pages.is_empty() {
            return Err(Error::InvalidSequence(String::from(
                "at least one page is required",
            )));
        }
        Ok(Self(pages))
    }

    /// Parse comma separated page numbers such as `"7, 0, 1, 2"`. Blank entries (e.g. a trailing
    /// comma) are skipped.
    ///
    /// # Errors
    ///
    /// Any entry that is not a non-negative integer, or an input with no entries at all, results
    /// in `Error::InvalidSequence`.
    pub fn parse(input: &str) -> Result<Self> {
        let pages = parse_pages(input.split(','))?;
        Self::build(pages)
    }

    /// Read a sequence from a text file. Each line may hold one or more page numbers separated by
    /// commas or whitespace.
    ///
    /// # Errors
    ///
    /// Fails with `Error::Io` if the file cannot be opened or read and with
    /// `Error::InvalidSequence` if its content does not parse.
    pub fn from_file(filename: &str) -> Result<Self> {
        let reader = PageReader::new(filename)?;
        let pages = reader.collect::<Result<Vec<PageId>>>()?;
        Self::build(pages)
    }

    /// Generate a random sequence of 10 to 19 references over pages 1 through 8. Past the first few
    /// entries, references favour one of the three most recent pages to mimic locality of
    /// reference.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let length = rng.gen_range(RANDOM_MIN_LENGTH..RANDOM_MAX_LENGTH);
        let mut pages: Vec<PageId> = Vec::with_capacity(length);
        for i in 0..length {
            if i > LOCALITY_WARMUP && rng.gen_bool(LOCALITY_PROBABILITY) {
                let back = rng.gen_range(0..LOCALITY_WINDOW);
                pages.push(pages[i - 1 - back]);
            } else {
                pages.push(rng.gen_range(1..=RANDOM_MAX_PAGE));
            }
        }
        Self(pages)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[PageId] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<PageId> {
        self.0.get(index).copied()
    }

    /// Index of the next request for `page` strictly after position `after`, if there is one.
    pub fn next_use(&self, page: PageId, after: usize) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .skip(after + 1)
            .find(|(_, candidate)| **candidate == page)
            .map(|(index, _)| index)
    }
}

impl Index<usize> for ReferenceSequence {
    type Output = PageId;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromStr for ReferenceSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ReferenceSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|page| page.to_string())
            .collect::<Vec<String>>()
            .join(",");
        write!(f, "{}", joined)
    }
}

fn parse_pages<'a, I>(tokens: I) -> Result<Vec<PageId>>
where
    I: Iterator<Item = &'a str>,
{
    tokens
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<PageId>()
                .map_err(|_| Error::InvalidSequence(format!("'{}' is not a page number", token)))
        })
        .collect()
}

/// `PageReader` sequentially yields page numbers from a text file, line by line. A line may hold
/// several numbers separated by commas or whitespace.
pub struct PageReader {
    reader: BufReader<File>,
    pending: Vec<PageId>,
    pub line_number: u64,
}

impl PageReader {
    /// Open `filename` for reading.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file does not exist or cannot be opened.
    pub fn new(filename: &str) -> Result<Self> {
        let file = File::open(filename)?;
        Ok(Self {
            reader: BufReader::new(file),
            pending: Vec::new(),
            line_number: 0,
        })
    }
}

impl Iterator for PageReader {
    type Item = Result<PageId>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() {
            let mut buffer = String::new();
            match self.reader.read_line(&mut buffer) {
                Err(err) => return Some(Err(err.into())),
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let tokens = buffer.split(|c: char| c == ',' || c.is_whitespace());
                    match parse_pages(tokens) {
                        Ok(mut pages) => {
                            pages.reverse();
                            self.pending = pages;
                        }
                        Err(err) => return Some(Err(err)),
                    }
                }
            }
        }
        self.pending.pop().map(Ok)
    }
}
