//! Prompt construction for the lyrics LLM.
//!
//! The line-count, phrase, and length requirements are soft: they are asked
//! of the model and trusted, not re-validated on the way out. The
//! deterministic fallback template honors the same numbers by construction.

use crate::user::{Gender, SongDetails};

/// How many lines of lyrics to ask for.
pub const LINE_COUNT: usize = 16;

/// The phrase that must appear at least twice.
pub const REQUIRED_PHRASE: &str = "Happy birthday";

/// Per-line ceilings requested of the model.
pub const MAX_WORDS_PER_LINE: usize = 8;
pub const MAX_CHARS_PER_LINE: usize = 40;

pub fn build(details: &SongDetails) -> String {
    let (object_pronoun, possessive_pronoun) = pronouns(details.gender);

    format!(
        "Wish a happy birthday to {name}.

Ensure that \"{phrase}\" is mentioned at least twice in the lyrics, and it should rhyme. The lyrics should use simple, short, and easy to pronounce words as much as possible.

Using the above information, please write {lines} lines of {genre} lyrics that I can dedicate to {object_pronoun} for {possessive_pronoun} birthday. Each line can have maximum of {words} words or {chars} characters.

Additional context:
 Recipient's name: {name}
 Age they're turning: {age}
 Song mood: {mood}
 Music genre: {genre}
 Singer voice: {voice}

IMPORTANT REQUIREMENTS:
- The lyrics generated should be completely unique and never written before
- Should not infringe on any trademarks/copyrights or rights of any individual or entity
- Avoid any references or similarity to existing lyrics of any song anywhere in the world
- Avoid any mention of proper nouns (names or places) apart from {name}
- Should not be insensitive or offensive to any person/place/caste/religion/creed/tribe/country/gender/government/organization
- Completely avoid any words which might be construed as cuss words or offensive in any language
- Use simple, easy-to-pronounce words
- Make it rhyme naturally
- Include \"{phrase}\" at least twice
- Each line maximum {words} words or {chars} characters
- Total {lines} lines
- Match the {mood} mood
- Suitable for {voice} voice

Generate only the lyrics, no additional text or formatting.",
        name = details.birthday_person_name,
        age = details.age,
        mood = details.mood.as_str(),
        genre = details.genre.as_str(),
        voice = details.singer_voice.as_str(),
        phrase = REQUIRED_PHRASE,
        lines = LINE_COUNT,
        words = MAX_WORDS_PER_LINE,
        chars = MAX_CHARS_PER_LINE,
        object_pronoun = object_pronoun,
        possessive_pronoun = possessive_pronoun,
    )
}

fn pronouns(gender: Gender) -> (&'static str, &'static str) {
    match gender {
        Gender::Male => ("him", "his"),
        Gender::Female => ("her", "her"),
    }
}

#[cfg(test)]
mod tests {
    use crate::user::{Gender, Genre, Mood, SongDetails, Voice};

    use super::{build, LINE_COUNT, REQUIRED_PHRASE};

    fn details() -> SongDetails {
        SongDetails {
            birthday_person_name: "Asha".to_owned(),
            age: 30,
            gender: Gender::Female,
            mood: Mood::Happy,
            genre: Genre::Pop,
            singer_voice: Voice::Female,
        }
    }

    #[test]
    fn prompt_carries_the_request_attributes() {
        let prompt = build(&details());

        assert!(prompt.contains("Asha"));
        assert!(prompt.contains("30"));
        assert!(prompt.contains("Pop"));
        assert!(prompt.contains("Happy"));
        assert!(prompt.contains(REQUIRED_PHRASE));
        assert!(prompt.contains(&format!("Total {} lines", LINE_COUNT)));
    }

    #[test]
    fn prompt_uses_pronouns_for_the_recipient() {
        let prompt = build(&details());
        assert!(prompt.contains("dedicate to her for her birthday"));

        let mut male = details();
        male.gender = Gender::Male;
        let prompt = build(&male);
        assert!(prompt.contains("dedicate to him for his birthday"));
    }
}
