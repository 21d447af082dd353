quantity!(Percentage, "%", 0);
