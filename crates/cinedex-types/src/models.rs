use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user as exposed to clients. The password digest is never part of this
/// type; it stays in the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    /// Movie ids in the order they were favorited. Never contains duplicates.
    pub favorite_movies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Genre {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Director {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub birth: Option<NaiveDate>,
    #[serde(default)]
    pub death: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub director: Director,
    /// Cast in billing order.
    #[serde(default)]
    pub actors: Vec<String>,
    pub image_path: String,
    pub featured: bool,
}

/// A movie entry in a seed file: same shape as [`Movie`] minus the id, which
/// the store assigns on import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub genre: Genre,
    pub director: Director,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub featured: bool,
}

impl NewMovie {
    pub fn into_movie(self, id: String) -> Movie {
        Movie {
            id,
            title: self.title,
            description: self.description,
            genre: self.genre,
            director: self.director,
            actors: self.actors,
            image_path: self.image_path,
            featured: self.featured,
        }
    }
}
