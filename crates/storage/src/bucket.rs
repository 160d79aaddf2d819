/// Kind of artifact, each stored in its own bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Images,
    Models,
    Datasets,
    Temp,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Images, Bucket::Models, Bucket::Datasets, Bucket::Temp];
}

/// Concrete bucket names, configurable per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketNames {
    pub images: String,
    pub models: String,
    pub datasets: String,
    pub temp: String,
}

impl BucketNames {
    pub fn name(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Images => &self.images,
            Bucket::Models => &self.models,
            Bucket::Datasets => &self.datasets,
            Bucket::Temp => &self.temp,
        }
    }
}

impl Default for BucketNames {
    fn default() -> Self {
        Self {
            images: "images".into(),
            models: "models".into(),
            datasets: "datasets".into(),
            temp: "temp".into(),
        }
    }
}
