mod invariant_properties;
mod publication_tests;
mod replay_tests;
