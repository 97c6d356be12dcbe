//! Token and phrase interning

use std::collections::HashMap;

/// Dense id of a word
pub type TokenId = u32;

/// Dense id of a phrase on one side of the table
pub type PhraseId = u32;

/// Word interner shared by both sides of the table
#[derive(Debug, Default)]
pub struct Vocab {
    str_to_id: HashMap<String, TokenId>,
    id_to_str: Vec<String>,
}

impl Vocab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `word`, assigning a fresh one on first sight
    pub fn intern(&mut self, word: &str) -> TokenId {
        if let Some(&id) = self.str_to_id.get(word) {
            return id;
        }
        let id = self.id_to_str.len() as TokenId;
        self.str_to_id.insert(word.to_string(), id);
        self.id_to_str.push(word.to_string());
        id
    }

    /// Interns every whitespace-separated token of `text`
    pub fn intern_phrase(&mut self, text: &str) -> Vec<TokenId> {
        text.split_whitespace().map(|w| self.intern(w)).collect()
    }

    pub fn word(&self, id: TokenId) -> &str {
        &self.id_to_str[id as usize]
    }

    /// Rebuilds phrase text with single spaces between tokens
    pub fn render(&self, tokens: &[TokenId]) -> String {
        let mut out = String::new();
        for (i, &id) in tokens.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(self.word(id));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }
}

/// Maps token sequences of one side to dense phrase ids
#[derive(Debug, Default)]
pub struct PhraseInterner {
    lookup: HashMap<Box<[TokenId]>, PhraseId>,
    phrases: Vec<Box<[TokenId]>>,
}

impl PhraseInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `tokens`, assigning a fresh one on first sight
    pub fn intern(&mut self, tokens: &[TokenId]) -> PhraseId {
        if let Some(&id) = self.lookup.get(tokens) {
            return id;
        }
        let id = self.phrases.len() as PhraseId;
        let boxed: Box<[TokenId]> = tokens.into();
        self.lookup.insert(boxed.clone(), id);
        self.phrases.push(boxed);
        id
    }

    /// Looks up a phrase without interning it
    pub fn get(&self, tokens: &[TokenId]) -> Option<PhraseId> {
        self.lookup.get(tokens).copied()
    }

    pub fn tokens(&self, id: PhraseId) -> &[TokenId] {
        &self.phrases[id as usize]
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
