//! Static category/word table and the random pick used when the host starts
//! a round without choosing a word themselves.

use rand::seq::IndexedRandom;
use rand::Rng;

pub struct Category {
    pub name: &'static str,
    pub words: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Animales",
        words: &[
            "León", "Elefante", "Jirafa", "Pingüino", "Delfín", "Águila", "Tigre", "Oso",
            "Canguro", "Koala",
        ],
    },
    Category {
        name: "Comida",
        words: &[
            "Pizza",
            "Hamburguesa",
            "Sushi",
            "Tacos",
            "Helado",
            "Chocolate",
            "Paella",
            "Ensalada",
            "Espagueti",
            "Queso",
        ],
    },
    Category {
        name: "Lugares",
        words: &[
            "Playa",
            "Montaña",
            "Cine",
            "Escuela",
            "Hospital",
            "Aeropuerto",
            "Biblioteca",
            "Parque",
            "Gimnasio",
            "Restaurante",
        ],
    },
    Category {
        name: "Objetos de Casa",
        words: &[
            "Silla",
            "Mesa",
            "Cama",
            "Lámpara",
            "Espejo",
            "Refrigerador",
            "Televisión",
            "Sofá",
            "Reloj",
            "Microondas",
        ],
    },
    Category {
        name: "Profesiones",
        words: &[
            "Médico",
            "Profesor",
            "Bombero",
            "Policía",
            "Cocinero",
            "Astronauta",
            "Pintor",
            "Músico",
            "Ingeniero",
            "Abogado",
        ],
    },
    Category {
        name: "Deportes",
        words: &[
            "Fútbol",
            "Baloncesto",
            "Tenis",
            "Natación",
            "Voleibol",
            "Golf",
            "Boxeo",
            "Ciclismo",
            "Atletismo",
            "Béisbol",
        ],
    },
];

/// A category/word pair for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCard {
    pub category: String,
    pub word: String,
}

/// Pick a uniform random category, then a uniform random word from it.
pub fn random_word<R: Rng + ?Sized>(rng: &mut R) -> WordCard {
    // CATEGORIES is a non-empty const table, so the picks cannot fail.
    let category = CATEGORIES.choose(rng).unwrap_or(&CATEGORIES[0]);
    let word = category.words.choose(rng).copied().unwrap_or("");
    WordCard {
        category: category.name.to_string(),
        word: word.to_string(),
    }
}

/// Pick a uniform random word from the named category, `None` if the
/// category is not in the table.
pub fn word_from_category<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Option<WordCard> {
    let category = CATEGORIES.iter().find(|c| c.name == name)?;
    let word = category.words.choose(rng).copied().unwrap_or("");
    Some(WordCard {
        category: category.name.to_string(),
        word: word.to_string(),
    })
}
