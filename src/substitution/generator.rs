//! Synthetic value generation
//!
//! Produces syntactically well-formed pt-BR replacement values per
//! category. Identifier-shaped originals (CPF, CNPJ, phone, CEP) keep
//! their punctuation skeleton with randomized digits, so a CPF-shaped
//! original always yields a CPF-shaped synthetic. Name material is sampled
//! from the shared lexicon bundle. Seedable for reproducible runs.

use crate::detection::ner::NameLexicon;
use crate::domain::PiiCategory;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ORG_PREFIXES: [&str; 6] = [
    "Empresa",
    "Grupo",
    "Companhia",
    "Instituto",
    "Comércio",
    "Indústria",
];
const STREET_TYPES: [&str; 4] = ["Rua", "Avenida", "Travessa", "Alameda"];
const EMAIL_DOMAINS: [&str; 3] = ["exemplo.com.br", "correio-exemplo.com.br", "mail-exemplo.net"];
const NAME_CONNECTIVES: [&str; 5] = ["da", "de", "do", "das", "dos"];

/// Seedable synthetic value generator over the lexicon bundle.
pub struct SyntheticGenerator {
    rng: StdRng,
    given_names: Vec<String>,
    surnames: Vec<String>,
    municipalities: Vec<String>,
    streets: Vec<String>,
}

impl SyntheticGenerator {
    /// Build a generator. Lexicon samples are collected into sorted lists
    /// so a fixed seed yields a fixed value sequence.
    pub fn new(lexicon: &NameLexicon, seed: Option<u64>) -> Self {
        let mut given_names: Vec<String> = lexicon.given_names().map(capitalize_word).collect();
        given_names.sort();
        let mut surnames: Vec<String> = lexicon.surnames().map(capitalize_word).collect();
        surnames.sort();
        let mut municipalities: Vec<String> =
            lexicon.municipalities().map(title_case).collect();
        municipalities.sort();
        let streets = lexicon.streets().to_vec();

        Self {
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
            given_names,
            surnames,
            municipalities,
            streets,
        }
    }

    /// Generate a synthetic value for a category. `original` is consulted
    /// only for its shape (digit skeleton), never echoed back.
    pub fn generate(&mut self, category: PiiCategory, original: &str) -> String {
        match category {
            PiiCategory::Person => {
                let given = pick(&mut self.rng, &self.given_names);
                let surname = pick(&mut self.rng, &self.surnames);
                format!("{given} {surname}")
            }
            PiiCategory::Org => {
                let prefix = ORG_PREFIXES[self.rng.gen_range(0..ORG_PREFIXES.len())];
                let surname = pick(&mut self.rng, &self.surnames);
                format!("{prefix} {surname} Ltda")
            }
            PiiCategory::Address => self.address(original),
            PiiCategory::Email => self.email(),
            PiiCategory::Phone => {
                if original.chars().any(|c| c.is_ascii_digit()) {
                    self.digit_skeleton(original)
                } else {
                    let dd = self.rng.gen_range(11..100);
                    let head = self.rng.gen_range(1000..10000);
                    let tail = self.rng.gen_range(1000..10000);
                    format!("({dd}) 9{head}-{tail}")
                }
            }
            PiiCategory::IdNumber => {
                if original.chars().any(|c| c.is_ascii_digit()) {
                    self.digit_skeleton(original)
                } else {
                    let a = self.rng.gen_range(100..1000);
                    let b = self.rng.gen_range(100..1000);
                    let c = self.rng.gen_range(100..1000);
                    let d = self.rng.gen_range(10..100);
                    format!("{a}.{b}.{c}-{d}")
                }
            }
            PiiCategory::Other => format!("dado-{:05}", self.rng.gen_range(0..100_000u32)),
        }
    }

    fn address(&mut self, original: &str) -> String {
        // CEP-shaped originals keep their shape; everything else becomes a
        // street or municipality depending on what the original looked like.
        if !original.chars().any(char::is_alphabetic) {
            return self.digit_skeleton(original);
        }
        let first_word = original
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();
        let is_street = matches!(
            first_word.as_str(),
            "rua" | "avenida" | "av" | "alameda" | "travessa" | "praça" | "praca" | "rodovia"
                | "estrada"
        );
        if is_street || original.chars().any(|c| c.is_ascii_digit()) {
            let street_type = STREET_TYPES[self.rng.gen_range(0..STREET_TYPES.len())];
            let street = pick(&mut self.rng, &self.streets);
            let number = self.rng.gen_range(1..3000);
            format!("{street_type} {street}, {number}")
        } else {
            pick(&mut self.rng, &self.municipalities)
        }
    }

    fn email(&mut self) -> String {
        let given = ascii_fold(&pick(&mut self.rng, &self.given_names).to_lowercase());
        let surname = ascii_fold(&pick(&mut self.rng, &self.surnames).to_lowercase());
        let n = self.rng.gen_range(10..100);
        let domain = EMAIL_DOMAINS[self.rng.gen_range(0..EMAIL_DOMAINS.len())];
        format!("{given}.{surname}{n}@{domain}")
    }

    /// Replace every ASCII digit with a random digit, keeping punctuation
    /// and spacing intact.
    fn digit_skeleton(&mut self, original: &str) -> String {
        original
            .chars()
            .map(|c| {
                if c.is_ascii_digit() {
                    char::from(b'0' + self.rng.gen_range(0..10u8))
                } else {
                    c
                }
            })
            .collect()
    }

}

fn pick(rng: &mut StdRng, items: &[String]) -> String {
    items[rng.gen_range(0..items.len())].clone()
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|w| {
            if NAME_CONNECTIVES.contains(&w) {
                w.to_string()
            } else {
                capitalize_word(w)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn ascii_fold(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' => 'e',
            'í' | 'ì' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ç' => 'c',
            _ => c,
        })
        .collect()
}
