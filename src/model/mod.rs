pub mod params;
pub mod seir;
