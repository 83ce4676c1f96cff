//! The deterministic fallback generator: the guaranteed-success end of the
//! lyrics chain. It cannot fail and its output satisfies the prompt
//! constraints by construction.

use crate::user::{Gender, SongDetails};

pub fn render(details: &SongDetails) -> String {
    let closer = match details.gender {
        Gender::Male => "men",
        Gender::Female => "friends",
    };

    format!(
        "Happy birthday to you, {name}!
Another year of joy and cheer
Celebrating you today
{age} years of awesome here

Happy birthday, make a wish
Dancing like a happy fish
Friends around to celebrate
You're so cool, you're really great

Cake and candles, music loud
You should feel so very proud
Growing up but stay so sweet
Life with you is such a treat

Happy birthday once again
You're the best among all {closer}
May your dreams all come so true
This special day is just for you",
        name = details.birthday_person_name,
        age = details.age,
        closer = closer,
    )
}

#[cfg(test)]
mod tests {
    use crate::generation::prompt::{LINE_COUNT, REQUIRED_PHRASE};
    use crate::user::{Gender, Genre, Mood, SongDetails, Voice};

    use super::render;

    fn details() -> SongDetails {
        SongDetails {
            birthday_person_name: "Ravi".to_owned(),
            age: 25,
            gender: Gender::Male,
            mood: Mood::Funny,
            genre: Genre::Rap,
            singer_voice: Voice::Male,
        }
    }

    #[test]
    fn satisfies_the_prompt_constraints() {
        let lyrics = render(&details());

        let lines: Vec<&str> = lyrics.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), LINE_COUNT);

        let mentions = lyrics.matches(REQUIRED_PHRASE).count();
        assert!(mentions >= 2, "only {} mentions of the phrase", mentions);
    }

    #[test]
    fn addresses_the_birthday_person() {
        let lyrics = render(&details());

        assert!(lyrics.contains("Ravi"));
        assert!(lyrics.contains("25 years"));
        assert!(lyrics.contains("among all men"));

        let mut other = details();
        other.gender = Gender::Female;
        assert!(render(&other).contains("among all friends"));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(render(&details()), render(&details()));
    }
}
