// Lexicon
// Read-only lookup tables shared by every analyzer.
//
// The standard tables are a process-wide static; tests and callers that need
// different word lists construct their own `Lexicon` and use the `*_with` entry points.

use std::sync::OnceLock;

/// One transition category (e.g. "contrast") with its canonical phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCategory {
    pub name: &'static str,
    pub phrases: &'static [&'static str],
}

/// Topic trigger for the local plagiarism stand-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseSource {
    pub keyword: &'static str,
    pub text: &'static str,
    pub match_percentage: u8,
    pub source: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    pub function_words: &'static [&'static str],
    /// misspelling -> suggested corrections
    pub misspellings: &'static [(&'static str, &'static [&'static str])],
    pub academic_terms: &'static [&'static str],
    pub academic_suffixes: &'static [&'static str],
    pub unusual_letter_pairs: &'static [&'static str],
    /// Formal connectives counted by the style sub-analysis
    pub formal_transitions: &'static [&'static str],
    pub transition_categories: &'static [TransitionCategory],
    pub verb_synonyms: &'static [(&'static str, &'static [&'static str])],
    pub noun_synonyms: &'static [(&'static str, &'static [&'static str])],
    pub generic_synonyms: &'static [(&'static str, &'static [&'static str])],
    /// everyday word -> academic alternative
    pub academic_alternatives: &'static [(&'static str, &'static str)],
    pub phrase_sources: &'static [PhraseSource],
}

const FUNCTION_WORDS: &[&str] = &[
    "the", "and", "of", "to", "in", "is", "it", "for", "on", "as", "that", "with", "this", "from",
    "have", "they", "their", "there", "which", "were",
];

const MISSPELLINGS: &[(&str, &[&str])] = &[
    ("teh", &["the"]),
    ("recieve", &["receive"]),
    ("seperate", &["separate"]),
    ("definately", &["definitely"]),
    ("occured", &["occurred"]),
    ("untill", &["until"]),
    ("wich", &["which"]),
    ("thier", &["their"]),
    ("beleive", &["believe"]),
    ("goverment", &["government"]),
    ("enviroment", &["environment"]),
    ("accross", &["across"]),
    ("arguement", &["argument"]),
    ("begining", &["beginning"]),
    ("calender", &["calendar"]),
    ("existance", &["existence"]),
    ("independant", &["independent"]),
    ("neccessary", &["necessary"]),
    ("occassion", &["occasion"]),
    ("alot", &["a lot", "allot"]),
    ("becuase", &["because"]),
    ("truely", &["truly"]),
];

const ACADEMIC_TERMS: &[&str] = &[
    "analyze", "analysis", "hypothesis", "methodology", "paradigm", "empirical", "framework",
    "synthesis", "theoretical", "significant", "consequently", "furthermore", "nevertheless",
    "phenomenon", "perspective", "implication", "interpretation", "substantial", "criterion",
    "discourse", "rhetoric", "ambiguous", "inherent", "comprehensive", "subsequently",
];

const ACADEMIC_SUFFIXES: &[&str] = &["ology", "ism", "ization", "istic"];

const UNUSUAL_LETTER_PAIRS: &[&str] = &["xz", "qp", "vf", "jx"];

const FORMAL_TRANSITIONS: &[&str] = &[
    "however",
    "furthermore",
    "moreover",
    "consequently",
    "therefore",
    "additionally",
    "thus",
];

const TRANSITION_CATEGORIES: &[TransitionCategory] = &[
    TransitionCategory {
        name: "addition",
        phrases: &["furthermore", "moreover", "additionally", "in addition", "also", "besides"],
    },
    TransitionCategory {
        name: "contrast",
        phrases: &["however", "nevertheless", "on the other hand", "in contrast", "conversely", "although"],
    },
    TransitionCategory {
        name: "cause",
        phrases: &["therefore", "consequently", "as a result", "thus", "because", "hence"],
    },
    TransitionCategory {
        name: "example",
        phrases: &["for example", "for instance", "such as", "specifically", "to illustrate", "namely"],
    },
    TransitionCategory {
        name: "emphasis",
        phrases: &["indeed", "in fact", "notably", "certainly", "above all", "clearly"],
    },
];

const VERB_SYNONYMS: &[(&str, &[&str])] = &[
    ("show", &["demonstrate", "illustrate", "reveal"]),
    ("make", &["create", "produce", "generate"]),
    ("think", &["consider", "contend", "maintain"]),
    ("help", &["assist", "facilitate", "support"]),
    ("change", &["alter", "transform", "modify"]),
    ("need", &["require", "necessitate", "demand"]),
    ("believe", &["argue", "hold", "posit"]),
    ("improve", &["enhance", "refine", "strengthen"]),
];

const NOUN_SYNONYMS: &[(&str, &[&str])] = &[
    ("thing", &["element", "factor", "aspect"]),
    ("things", &["elements", "factors", "aspects"]),
    ("people", &["individuals", "citizens", "communities"]),
    ("problem", &["issue", "challenge", "difficulty"]),
    ("idea", &["concept", "notion", "proposition"]),
    ("result", &["outcome", "consequence", "effect"]),
    ("society", &["community", "the public", "civilization"]),
    ("world", &["globe", "international community", "society"]),
];

const GENERIC_SYNONYMS: &[(&str, &[&str])] = &[
    ("good", &["beneficial", "effective", "favorable"]),
    ("important", &["crucial", "significant", "essential"]),
    ("really", &["genuinely", "substantially", "considerably"]),
    ("very", &["highly", "exceedingly", "particularly"]),
    ("many", &["numerous", "various", "countless"]),
    ("different", &["distinct", "diverse", "varied"]),
    ("great", &["considerable", "substantial", "remarkable"]),
    ("affect", &["influence", "shape", "impact"]),
];

const ACADEMIC_ALTERNATIVES: &[(&str, &str)] = &[
    ("show", "demonstrate"),
    ("use", "utilize"),
    ("get", "obtain"),
    ("big", "substantial"),
    ("think", "contend"),
    ("find out", "determine"),
    ("look at", "examine"),
    ("good", "beneficial"),
    ("bad", "detrimental"),
    ("help", "facilitate"),
    ("start", "initiate"),
    ("end", "conclude"),
];

const PHRASE_SOURCES: &[PhraseSource] = &[
    PhraseSource {
        keyword: "digital revolution",
        text: "The digital revolution has fundamentally transformed the way we communicate and access information",
        match_percentage: 15,
        source: "Encyclopedia of Digital Media",
        url: "https://en.wikipedia.org/wiki/Digital_Revolution",
    },
    PhraseSource {
        keyword: "artificial intelligence",
        text: "Artificial intelligence is the simulation of human intelligence processes by machines",
        match_percentage: 20,
        source: "Introduction to Artificial Intelligence",
        url: "https://en.wikipedia.org/wiki/Artificial_intelligence",
    },
    PhraseSource {
        keyword: "climate change",
        text: "Climate change refers to long-term shifts in temperatures and weather patterns",
        match_percentage: 18,
        source: "United Nations Climate Action",
        url: "https://www.un.org/en/climatechange/what-is-climate-change",
    },
    PhraseSource {
        keyword: "social media",
        text: "Social media platforms have changed how people share information and form communities",
        match_percentage: 12,
        source: "Journal of Communication Studies",
        url: "https://en.wikipedia.org/wiki/Social_media",
    },
];

impl Lexicon {
    /// The built-in English tables
    pub fn standard() -> &'static Lexicon {
        static LEXICON: OnceLock<Lexicon> = OnceLock::new();
        LEXICON.get_or_init(Lexicon::default)
    }

    pub fn is_function_word(&self, word: &str) -> bool {
        self.function_words.contains(&word)
    }

    /// Words longer than three characters that are not function words
    pub fn is_content_word(&self, word: &str) -> bool {
        word.chars().count() > 3 && !self.is_function_word(word)
    }

    pub fn corrections_for(&self, word: &str) -> Option<&'static [&'static str]> {
        self.misspellings
            .iter()
            .find(|(wrong, _)| *wrong == word)
            .map(|(_, fixes)| *fixes)
    }

    pub fn is_academic_term(&self, word: &str) -> bool {
        self.academic_terms.contains(&word)
            || self.academic_suffixes.iter().any(|suffix| word.ends_with(suffix))
    }

    pub fn has_unusual_letter_pair(&self, word: &str) -> bool {
        self.unusual_letter_pairs.iter().any(|pair| word.contains(pair))
    }

    /// Synonyms from the verb table, then the noun table, then the generic table
    pub fn synonyms_for(&self, word: &str) -> Option<&'static [&'static str]> {
        self.verb_synonyms
            .iter()
            .chain(self.noun_synonyms.iter())
            .chain(self.generic_synonyms.iter())
            .find(|(w, _)| *w == word)
            .map(|(_, alts)| *alts)
    }

    pub fn transition_phrase_count(&self) -> usize {
        self.transition_categories.iter().map(|c| c.phrases.len()).sum()
    }

    pub fn category_of(&self, phrase: &str) -> Option<&TransitionCategory> {
        self.transition_categories
            .iter()
            .find(|c| c.phrases.contains(&phrase))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            function_words: FUNCTION_WORDS,
            misspellings: MISSPELLINGS,
            academic_terms: ACADEMIC_TERMS,
            academic_suffixes: ACADEMIC_SUFFIXES,
            unusual_letter_pairs: UNUSUAL_LETTER_PAIRS,
            formal_transitions: FORMAL_TRANSITIONS,
            transition_categories: TRANSITION_CATEGORIES,
            verb_synonyms: VERB_SYNONYMS,
            noun_synonyms: NOUN_SYNONYMS,
            generic_synonyms: GENERIC_SYNONYMS,
            academic_alternatives: ACADEMIC_ALTERNATIVES,
            phrase_sources: PHRASE_SOURCES,
        }
    }
}
