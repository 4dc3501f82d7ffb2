use async_trait::async_trait;

use crate::gateway::{GatewayError, RecommendationSource};

struct GenreEntry {
    genre: &'static str,
    // `{}` is replaced by the user's description.
    template: &'static str,
}

const GENRES: &[GenreEntry] = &[
    GenreEntry {
        genre: "acción",
        template: "Si buscas algo {}, te recomiendo 'John Wick' o 'Mad Max: Fury Road'.",
    },
    GenreEntry {
        genre: "ciencia ficción",
        template: "Como buscas algo {}, podrías ver 'Interstellar' o 'Blade Runner 2049'.",
    },
    GenreEntry {
        genre: "terror",
        template: "Si quieres algo {}, te recomiendo 'Hereditary' o 'El Conjuro'.",
    },
    GenreEntry {
        genre: "comedia",
        template: "Para algo {}, 'Brooklyn Nine-Nine' o 'Superbad' serían ideales.",
    },
    GenreEntry {
        genre: "drama",
        template: "Si buscas {}, 'Breaking Bad' o 'Forrest Gump' podrían gustarte.",
    },
    GenreEntry {
        genre: "anime",
        template: "Si quieres anime con {}, prueba 'Attack on Titan' o 'Steins;Gate'.",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct GenreCatalog;

impl GenreCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn genres(&self) -> impl Iterator<Item = &'static str> {
        GENRES.iter().map(|e| e.genre)
    }

    pub fn lookup(&self, query: &str) -> String {
        let query = query.trim();
        let lowered = query.to_lowercase();

        // Earliest mention in the query wins.
        let found = GENRES
            .iter()
            .filter_map(|e| lowered.find(e.genre).map(|pos| (pos, e)))
            .min_by_key(|(pos, _)| *pos);

        match found {
            Some((_, entry)) => entry.template.replace("{}", query),
            None => format!(
                "No tengo recomendaciones exactas para {}, pero intenta con otro género.",
                query
            ),
        }
    }
}

#[async_trait]
impl RecommendationSource for GenreCatalog {
    async fn recommend(&self, query: &str) -> Result<String, GatewayError> {
        Ok(self.lookup(query))
    }
}
