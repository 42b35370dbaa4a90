mod staging_tests;
