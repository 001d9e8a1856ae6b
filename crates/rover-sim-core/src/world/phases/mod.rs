mod decide;
mod motion;
mod perceive;
mod score;
