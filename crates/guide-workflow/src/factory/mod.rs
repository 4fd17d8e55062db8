pub mod guide_factory;

pub use guide_factory::GuideFactory;
